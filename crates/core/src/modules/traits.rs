use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::session::{SessionCommand, SessionEvent};

/// Unique identifier for each module type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModuleId {
    Surface,
    Session,
}

/// Events delivered into a module's run loop
#[derive(Debug, Clone)]
pub enum ModuleEvent {
    /// Host-side state change to mirror
    Session(SessionEvent),
    Shutdown,
}

/// Messages sent from a module back to whoever is driving it
#[derive(Debug)]
pub enum ModuleMessage {
    /// Session mutation requested by hardware input
    Command(SessionCommand),
    Status(String),
    Error(String),
}

/// Trait that all async modules must implement
#[async_trait]
pub trait AsyncModule: Send {
    /// Get the unique identifier for this module
    fn id(&self) -> ModuleId;

    /// Initialize the module (called once at startup)
    async fn initialize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Start the module's main loop
    async fn run(
        &mut self,
        rx: mpsc::Receiver<ModuleEvent>,
        tx: mpsc::Sender<ModuleMessage>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Shutdown the module gracefully
    async fn shutdown(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Get the module's status
    fn status(&self) -> HashMap<String, String>;
}
