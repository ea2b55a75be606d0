pub mod queue;
pub mod track;
