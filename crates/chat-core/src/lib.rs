pub mod archive;
pub mod conversation;
pub mod event_bus;
pub mod instruction;
pub mod ports;
pub mod session;

#[cfg(test)]
mod tests;
