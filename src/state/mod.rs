//! Scene engine
//!
//! Sessions, contexts, scenes and the scenario dispatcher that ties them to a
//! session store.

pub mod context;
pub mod scenario;
pub mod scene;
pub mod session;
pub mod wizard;

pub use context::{downcast, Context, SceneContext};
pub use scenario::{Dispatch, Scenario, DEFAULT_OPERATION_TIMEOUT};
pub use scene::Scene;
pub use session::{ErasedSession, Session, SessionData};
pub use wizard::{StepResult, Wizard, INACTIVE_STEP};
