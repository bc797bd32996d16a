//! Background tasks.

pub mod reminder_task;
