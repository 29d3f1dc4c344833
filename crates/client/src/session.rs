//! One user's dashboard on one surface: the placement engine plus the
//! gateway that persists it.

use fibervision_core::grid::{ContainerId, GridOptions, PlacementEngine};

use crate::error::GatewayError;
use crate::gateway::LayoutGateway;

pub struct DashboardSession<G> {
    gateway: G,
    engine: PlacementEngine,
    container: ContainerId,
    version: i32,
}

impl<G: LayoutGateway> DashboardSession<G> {
    pub fn new(gateway: G, container: impl Into<ContainerId>) -> Self {
        Self::with_options(gateway, container, GridOptions::default())
    }

    pub fn with_options(
        gateway: G,
        container: impl Into<ContainerId>,
        options: GridOptions,
    ) -> Self {
        Self {
            gateway,
            engine: PlacementEngine::new(options),
            container: container.into(),
            version: fibervision_core::widgets::INITIAL_LAYOUT_VERSION,
        }
    }

    /// Fetch the stored layout and bind it to the grid.
    ///
    /// Undecodable data loads as an empty layout. Any other failure leaves
    /// the engine and version untouched.
    pub async fn load(&mut self) -> Result<(), GatewayError> {
        let snapshot = match self.gateway.fetch().await {
            Ok(snapshot) => snapshot,
            Err(GatewayError::Malformed(reason)) => {
                tracing::warn!(%reason, "Stored layout is unreadable, starting empty");
                Default::default()
            }
            Err(e) => return Err(e),
        };
        tracing::debug!(
            container = %self.container.0,
            version = snapshot.version,
            widgets = snapshot.widgets.len(),
            "Layout loaded"
        );
        self.engine.initialize(self.container.clone(), snapshot.widgets);
        self.version = snapshot.version;
        Ok(())
    }

    /// Persist the engine's widgets. The engine stays dirty on failure.
    pub async fn save(&mut self) -> Result<i32, GatewayError> {
        let version = self.gateway.save(self.engine.widgets()).await?;
        self.engine.mark_saved();
        self.version = version;
        Ok(version)
    }

    /// Delete the stored layout, then remove every widget from the engine.
    ///
    /// On failure the widgets stay on the grid.
    pub async fn clear_all(&mut self) -> Result<(), GatewayError> {
        self.gateway.clear().await?;
        self.engine.clear_all();
        self.engine.mark_saved();
        self.version = fibervision_core::widgets::INITIAL_LAYOUT_VERSION;
        Ok(())
    }

    pub fn engine(&self) -> &PlacementEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut PlacementEngine {
        &mut self.engine
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn container(&self) -> &ContainerId {
        &self.container
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cached::CachedGateway;
    use crate::testing::ScriptedGateway;
    use fibervision_core::registry;
    use fibervision_core::widgets::WidgetConfig;
    use std::sync::Arc;

    fn stat_card() -> WidgetConfig {
        let def = registry::lookup("stat-card").unwrap();
        WidgetConfig::from_definition(def, None, None)
    }

    #[tokio::test]
    async fn edit_save_drag_save() {
        let store = Arc::new(ScriptedGateway::default());
        let mut session = DashboardSession::new(store.clone(), "dashboard-grid");

        session.load().await.unwrap();
        assert_eq!(session.version(), 1);
        assert!(session.engine().widgets().is_empty());
        assert!(!session.engine().is_dirty());

        let card = stat_card();
        let id = card.id.clone();
        assert!(session.engine_mut().add_widget(card));
        let placed = session.engine().get(&id).unwrap();
        assert_eq!((placed.x, placed.y, placed.w, placed.h), (Some(0), Some(0), 4, 2));
        assert!(session.engine().is_dirty());

        assert_eq!(session.save().await.unwrap(), 1);
        assert!(!session.engine().is_dirty());

        assert!(session.engine_mut().drag(&id, 2, 0));
        let moved = session.engine().get(&id).unwrap();
        assert_eq!((moved.x, moved.y), (Some(2), Some(0)));
        assert!(session.engine().is_dirty());
        // Nothing is stored until the next save.
        assert_eq!(store.fetch().await.unwrap().widgets[0].x, Some(0));

        assert_eq!(session.save().await.unwrap(), 2);
        assert_eq!(store.fetch().await.unwrap().widgets[0].x, Some(2));

        let mut reopened = DashboardSession::new(store.clone(), "dashboard-grid");
        reopened.load().await.unwrap();
        assert_eq!(reopened.version(), 2);
        assert_eq!(reopened.engine().widgets(), session.engine().widgets());
    }

    #[tokio::test]
    async fn failed_save_keeps_engine_dirty() {
        let store = Arc::new(ScriptedGateway::default());
        let mut session = DashboardSession::new(store.clone(), "dashboard-grid");
        session.load().await.unwrap();
        session.engine_mut().add_widget(stat_card());

        store.fail_next(GatewayError::Transport("offline".into()));
        assert!(session.save().await.is_err());
        assert!(session.engine().is_dirty());
        assert_eq!(session.version(), 1);

        assert_eq!(session.save().await.unwrap(), 1);
        assert!(!session.engine().is_dirty());
        assert_eq!(store.save_calls(), 2);
    }

    #[tokio::test]
    async fn failed_load_leaves_state_untouched() {
        let store = Arc::new(ScriptedGateway::default());
        let mut session = DashboardSession::new(store.clone(), "dashboard-grid");
        session.load().await.unwrap();
        session.engine_mut().add_widget(stat_card());
        session.save().await.unwrap();
        session.save().await.unwrap();

        store.fail_next(GatewayError::Unauthenticated);
        assert_eq!(session.load().await.unwrap_err(), GatewayError::Unauthenticated);
        assert_eq!(session.engine().widgets().len(), 1);
        assert_eq!(session.version(), 2);
    }

    #[tokio::test]
    async fn malformed_layout_loads_empty() {
        let store = Arc::new(ScriptedGateway::default());
        store.save(&[stat_card()]).await.unwrap();
        store.fail_next(GatewayError::Malformed("expected array".into()));

        let mut session = DashboardSession::new(store, "dashboard-grid");
        session.load().await.unwrap();
        assert!(session.engine().widgets().is_empty());
        assert_eq!(session.version(), 1);
        assert_eq!(session.engine().container(), Some(&ContainerId::from("dashboard-grid")));
    }

    #[tokio::test]
    async fn clear_all_twice_resets_to_v1() {
        let store = Arc::new(ScriptedGateway::default());
        let mut session = DashboardSession::new(CachedGateway::new(store.clone()), "dashboard-grid");
        session.load().await.unwrap();
        session.engine_mut().add_widget(stat_card());
        session.save().await.unwrap();

        session.clear_all().await.unwrap();
        session.clear_all().await.unwrap();

        assert_eq!(session.version(), 1);
        assert!(session.engine().widgets().is_empty());
        assert!(!session.engine().is_dirty());
        assert_eq!(store.fetch().await.unwrap().version, 1);

        session.load().await.unwrap();
        assert_eq!(session.version(), 1);
        assert_eq!(store.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn failed_clear_keeps_widgets() {
        let store = Arc::new(ScriptedGateway::default());
        let mut session = DashboardSession::new(store.clone(), "dashboard-grid");
        session.load().await.unwrap();
        session.engine_mut().add_widget(stat_card());
        session.save().await.unwrap();

        store.fail_next(GatewayError::Transport("offline".into()));
        assert!(session.clear_all().await.is_err());
        assert_eq!(session.engine().widgets().len(), 1);
        assert_eq!(session.version(), 1);
        assert_eq!(store.fetch().await.unwrap().widgets.len(), 1);

        session.clear_all().await.unwrap();
        assert!(session.engine().widgets().is_empty());
    }

    #[tokio::test]
    async fn far_away_stored_widget_loads() {
        let store = Arc::new(ScriptedGateway::default());
        let mut tall = stat_card();
        tall.x = Some(0);
        tall.y = Some(u32::MAX - 1);
        tall.h = u32::MAX;
        let neighbour = stat_card();
        store.save(&[tall, neighbour]).await.unwrap();

        let mut session = DashboardSession::new(store, "dashboard-grid");
        session.load().await.unwrap();
        assert_eq!(session.engine().widgets().len(), 2);
    }
}
