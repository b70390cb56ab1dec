use crate::model::focus::FocusContext;
use crate::model::ticket::{Ticket, TicketType};
use crate::ops::search::{find_by_key, keys_match, subtasks_for_task, tasks_for_epic};

/// A task or spike with its subtasks
#[derive(Debug, Clone)]
pub struct TaskNode<'a> {
    pub task: &'a Ticket,
    pub subtasks: Vec<&'a Ticket>,
}

#[derive(Debug, Clone)]
pub struct EpicNode<'a> {
    pub epic: &'a Ticket,
    pub tasks: Vec<TaskNode<'a>>,
}

/// Every loaded ticket arranged by hierarchy
#[derive(Debug, Clone, Default)]
pub struct TicketTree<'a> {
    pub epics: Vec<EpicNode<'a>>,
    /// Tasks with no epic, or whose epic is not loaded
    pub orphans: Vec<TaskNode<'a>>,
    /// Subtasks whose task is not loaded
    pub loose_subtasks: Vec<&'a Ticket>,
}

/// The part of the tree around the current focus
#[derive(Debug, Clone)]
pub enum FocusTree<'a> {
    Epic(EpicNode<'a>),
    Task(TaskNode<'a>),
}

fn task_node<'a>(tickets: &'a [Ticket], task: &'a Ticket) -> TaskNode<'a> {
    let subtasks = if task.has_key() {
        subtasks_for_task(tickets, &task.key)
    } else {
        Vec::new()
    };
    TaskNode { task, subtasks }
}

fn epic_node<'a>(tickets: &'a [Ticket], epic: &'a Ticket) -> EpicNode<'a> {
    let tasks = if epic.has_key() {
        tasks_for_epic(tickets, &epic.key)
            .into_iter()
            .map(|task| task_node(tickets, task))
            .collect()
    } else {
        Vec::new()
    };
    EpicNode { epic, tasks }
}

pub fn build_tree(tickets: &[Ticket]) -> TicketTree<'_> {
    let epic_known = |key: &str| {
        tickets
            .iter()
            .any(|t| t.ticket_type == TicketType::Epic && keys_match(&t.key, key))
    };
    let task_known = |key: &str| {
        tickets
            .iter()
            .any(|t| t.ticket_type.is_task_like() && keys_match(&t.key, key))
    };

    let mut tree = TicketTree::default();
    for ticket in tickets {
        match ticket.ticket_type {
            TicketType::Epic => tree.epics.push(epic_node(tickets, ticket)),
            TicketType::Task | TicketType::Spike => {
                if !epic_known(&ticket.epic_key) {
                    tree.orphans.push(task_node(tickets, ticket));
                }
            }
            TicketType::Subtask => {
                if !task_known(&ticket.parent_key) {
                    tree.loose_subtasks.push(ticket);
                }
            }
        }
    }
    tree
}

/// Subtree for the current focus: the focused epic if there is one,
/// otherwise the focused (orphan) task.
pub fn focus_tree<'a>(tickets: &'a [Ticket], focus: &FocusContext) -> Option<FocusTree<'a>> {
    if focus.has_epic() {
        let epic = find_by_key(tickets, &focus.epic_key)?;
        return Some(FocusTree::Epic(epic_node(tickets, epic)));
    }
    if focus.has_task() {
        let task = find_by_key(tickets, &focus.task_key)?;
        return Some(FocusTree::Task(task_node(tickets, task)));
    }
    None
}
