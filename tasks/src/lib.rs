//! # Tasklist
//!
//! State container and persistence for a to-do list screen.
//!
//! - [`repository`]: [`TaskRepository`] over a [`DocumentCollection`], every
//!   call bounded by a timeout and failures returned as values
//! - [`reducer`]: [`TasksReducer`], the screen's events and their effects
//! - [`view_model`]: [`TasksViewModel`], the reducer running in a store with
//!   observable state and one-shot UI effects
//! - [`date`]: storage and display timestamp formats
//! - [`collection`]: Firestore and in-memory document collections
//! - [`config`]: environment-driven setup
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tasklist::{TasksAction, TasksViewModel, UiEffect};
//! use tasklist::collection::InMemoryCollection;
//! use tasklist::repository::CollectionTaskRepository;
//! use tasklist_core::environment::SystemClock;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = CollectionTaskRepository::new(
//!     Arc::new(InMemoryCollection::new("tasks")),
//!     Arc::new(SystemClock),
//! );
//! let mut view_model = TasksViewModel::new(Arc::new(repository)).await?;
//! view_model.wait_until_loaded(Duration::from_secs(1)).await?;
//! let mut effects = view_model.subscribe_effects();
//!
//! view_model
//!     .dispatch_and_wait_for(
//!         TasksAction::AddTask { title: "Buy milk".into(), body: "2%".into() },
//!         |action| matches!(action, TasksAction::TasksLoaded { .. }),
//!         Duration::from_secs(1),
//!     )
//!     .await?;
//!
//! assert_eq!(view_model.state().await.tasks.len(), 1);
//! assert_eq!(effects.recv().await, Some(UiEffect::snackbar("Task added successfully")));
//! # Ok(())
//! # }
//! ```

pub mod collection;
pub mod config;
pub mod date;
pub mod error;
pub mod reducer;
pub mod repository;
pub mod types;
pub mod view_model;

pub use collection::DocumentCollection;
pub use config::TasklistConfig;
pub use error::{RepositoryError, Result};
pub use reducer::{TasksEnvironment, TasksReducer};
pub use repository::{CollectionTaskRepository, TaskRepository};
pub use types::{Task, TasksAction, TasksState, UiEffect};
pub use view_model::TasksViewModel;
