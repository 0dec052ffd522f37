pub mod handler;
pub mod leave_guard;
pub mod msg_command_handler;
pub mod msg_ping_handler;
pub mod msg_presence_handler;
pub mod msg_status_handler;
