/// Live board controllers, one per signed-in user
///
/// Each controller sits behind its own mutex, so one user's requests are
/// applied one at a time while different users never wait on each other.
/// The map lock is held only to look up, insert or remove an entry, never
/// across a store call.
///
/// A new controller is locked before it is published, and a sign-in waits
/// for the controller it replaces. Two sign-ins for the same user therefore
/// load one after the other, and only the first can find an empty board.

use std::collections::HashMap;
use std::sync::Arc;
use taskboard_shared::sync::{Controller, ControllerConfig, Gateway, LoadSource, Session};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Shared handle to one user's controller
pub type SharedController = Arc<Mutex<Controller>>;

/// Registry of signed-in users' controllers
#[derive(Clone)]
pub struct SessionRegistry {
    gateway: Arc<dyn Gateway>,
    config: ControllerConfig,
    controllers: Arc<RwLock<HashMap<Uuid, SharedController>>>,
}

impl SessionRegistry {
    pub fn new(gateway: Arc<dyn Gateway>, config: ControllerConfig) -> Self {
        Self {
            gateway,
            config,
            controllers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn new_controller(&self) -> SharedController {
        Arc::new(Mutex::new(Controller::new(self.gateway.clone(), self.config)))
    }

    /// Signs a user in with a fresh controller, replacing any previous one
    pub async fn sign_in(&self, session: Session) -> (SharedController, LoadSource) {
        let user_id = session.user_id;
        let shared = self.new_controller();
        let mut controller = shared.lock().await;

        let previous = self
            .controllers
            .write()
            .await
            .insert(user_id, shared.clone());

        if let Some(previous) = previous {
            previous.lock().await.clear();
        }

        let source = controller.sign_in(session).await;
        drop(controller);

        (shared, source)
    }

    /// The live controller for a user, signing them in only if none is live
    ///
    /// Unlike [`SessionRegistry::sign_in`], an existing controller is kept.
    pub async fn get_or_sign_in(&self, session: Session) -> SharedController {
        let user_id = session.user_id;
        let shared = self.new_controller();
        let mut controller = shared.lock().await;

        {
            let mut controllers = self.controllers.write().await;
            if let Some(existing) = controllers.get(&user_id) {
                return existing.clone();
            }
            controllers.insert(user_id, shared.clone());
        }

        controller.sign_in(session).await;
        drop(controller);

        shared
    }

    /// The live controller for a user, if signed in
    pub async fn get(&self, user_id: Uuid) -> Option<SharedController> {
        self.controllers.read().await.get(&user_id).cloned()
    }

    /// Signs a user out; returns whether a controller was live
    pub async fn sign_out(&self, user_id: Uuid) -> bool {
        let removed = self.controllers.write().await.remove(&user_id);

        match removed {
            Some(controller) => {
                controller.lock().await.sign_out();
                true
            }
            None => false,
        }
    }

    /// Number of signed-in users
    pub async fn len(&self) -> usize {
        self.controllers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
