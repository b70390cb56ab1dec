pub mod focus_ops;
pub mod search;
pub mod ticket_ops;
pub mod tree;
