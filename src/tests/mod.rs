//! Test modules and shared helpers

mod radar_items_tests;
mod scheduler_tests;

#[cfg(test)]
pub mod helpers {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use axum::{body::Body, http::Request, Router};
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use tokio::time::Instant;

    use crate::{
        config::run_migrations,
        lifecycle::shutdown::{ShutdownError, Subsystem},
        services::{
            inbox::EmailInbox,
            radar::{RadarError, RadarGenerator},
            radar_items::{RadarItemsError, RadarItemsService},
            scheduler::Clock,
            sender::MailService,
        },
        state::AppState,
    };

    pub const ALLOWED_SENDER: &str = "me@example.com";

    pub async fn setup_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    pub fn test_inbox(radar_items: RadarItemsService, buffer: usize) -> EmailInbox {
        EmailInbox::new(
            radar_items,
            MailService::unconfigured(),
            vec![ALLOWED_SENDER.to_owned()],
            buffer,
            true,
        )
    }

    /// Router over an in-memory database with an unstarted inbox.
    pub async fn test_app(api_key: &str) -> (Router, AppState, SqlitePool) {
        let db = setup_db().await;
        let radar_items = RadarItemsService::new(Some(db.clone()));
        let inbox = test_inbox(radar_items.clone(), 16);
        let state = AppState::new(radar_items, inbox, api_key, false);
        (crate::app::app(state.clone()), state, db)
    }

    pub fn form_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method("POST")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    pub fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method("GET")
            .body(Body::empty())
            .unwrap()
    }

    pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    /// Clock stuck at one hour.
    pub struct FixedClock(pub &'static str);

    impl Clock for FixedClock {
        fn current_hour(&self) -> String {
            self.0.to_owned()
        }
    }

    /// Generator that counts calls and optionally fails.
    #[derive(Clone, Default)]
    pub struct CountingGenerator {
        pub calls: Arc<AtomicUsize>,
        pub fail: bool,
    }

    impl CountingGenerator {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl RadarGenerator for CountingGenerator {
        async fn generate(&self) -> Result<String, RadarError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                Err(RadarError::Items(RadarItemsError::Unavailable))
            } else {
                Ok(format!("https://github.com/parkr/radar/issues/{n}"))
            }
        }
    }

    /// How a [`FakeSubsystem`] behaves when shut down.
    #[derive(Clone, Copy, Debug)]
    pub enum Behavior {
        Ok,
        Fail,
        Hang,
        Sleep(std::time::Duration),
    }

    /// Subsystem that records the order of shutdown calls.
    pub struct FakeSubsystem {
        pub name: &'static str,
        pub behavior: Behavior,
        pub log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl FakeSubsystem {
        pub fn new(name: &'static str, behavior: Behavior, log: &Arc<Mutex<Vec<&'static str>>>) -> Self {
            Self {
                name,
                behavior,
                log: Arc::clone(log),
            }
        }
    }

    impl Subsystem for FakeSubsystem {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn shutdown(&self, _deadline: Instant) -> Result<(), ShutdownError> {
            self.log.lock().unwrap().push(self.name);
            match self.behavior {
                Behavior::Ok => Ok(()),
                Behavior::Fail => Err(ShutdownError::Failed(format!("{} broke", self.name))),
                Behavior::Hang => std::future::pending().await,
                Behavior::Sleep(d) => {
                    tokio::time::sleep(d).await;
                    Ok(())
                }
            }
        }
    }
}
