#![allow(dead_code)]

use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use axum_test::TestServer;
use resizer_api::{setup_routes, AppState};
use resizer_core::Config;
use resizer_processing::test_helpers::{CountingTransformer, MemoryStorage, StaticFetcher};
use resizer_processing::{GifTransformer, PipelineOrchestrator};
use resizer_storage::Storage;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const PUBLIC_URL: &str = "https://out.example.com/";

/// Test application backed by local storage in a temp dir, with source images served
/// over HTTP from the same temp dir
pub struct TestApp {
    pub server: TestServer,
    pub temp_dir: TempDir,
    pub source_addr: SocketAddr,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.temp_dir.path().join("objects")
    }

    pub fn sources_dir(&self) -> PathBuf {
        self.temp_dir.path().join("sources")
    }

    /// HTTP location of `name` on the source server, whether or not it exists
    pub fn source_location(&self, name: &str) -> String {
        format!("http://{}/{}", self.source_addr, name)
    }

    /// Write a solid PNG to the source server and return its HTTP location
    pub fn source_image(&self, name: &str, width: u32, height: u32) -> String {
        image::RgbImage::from_pixel(width, height, image::Rgb([120, 60, 30]))
            .save(self.sources_dir().join(name))
            .expect("Failed to write source image");
        self.source_location(name)
    }

    /// Write a solid PNG to the temp dir and return its `file://` location
    pub fn local_file_image(&self, name: &str, width: u32, height: u32) -> String {
        let path = self.temp_dir.path().join(name);
        image::RgbImage::from_pixel(width, height, image::Rgb([120, 60, 30]))
            .save(&path)
            .expect("Failed to write source image");
        url::Url::from_file_path(&path)
            .expect("Temp path is absolute")
            .to_string()
    }
}

async fn serve_source(
    State(dir): State<Arc<PathBuf>>,
    UrlPath(name): UrlPath<String>,
) -> Result<Vec<u8>, StatusCode> {
    tokio::fs::read(dir.join(name))
        .await
        .map_err(|_| StatusCode::NOT_FOUND)
}

async fn spawn_source_server(dir: PathBuf) -> SocketAddr {
    let app = Router::new()
        .route("/{name}", get(serve_source))
        .with_state(Arc::new(dir));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind source server");
    let addr = listener.local_addr().expect("Source server has an address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    addr
}

pub fn create_test_config(local_path: &Path) -> Config {
    Config::from_vars(vec![
        ("publicurl".to_string(), PUBLIC_URL.to_string()),
        ("STORAGE_BACKEND".to_string(), "local".to_string()),
        (
            "LOCAL_STORAGE_PATH".to_string(),
            local_path.display().to_string(),
        ),
    ])
    .expect("Failed to build test config")
}

/// Real pipeline: HTTP fetcher, GIF transformer, local storage
pub async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let sources = temp_dir.path().join("sources");
    std::fs::create_dir_all(&sources).expect("Failed to create sources dir");
    let source_addr = spawn_source_server(sources).await;

    let config = create_test_config(&temp_dir.path().join("objects"));
    let (_state, router) = resizer_api::setup::initialize_app(config)
        .await
        .expect("Failed to initialize app");

    let server = TestServer::new(router.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        temp_dir,
        source_addr,
    }
}

/// Pipeline over in-memory collaborators, for failure scenarios
pub struct MockApp {
    pub server: TestServer,
    pub storage: Arc<MemoryStorage>,
    pub fetcher: Arc<StaticFetcher>,
    pub transformer: Arc<CountingTransformer<GifTransformer>>,
    _temp_dir: TempDir,
}

pub fn setup_mock_app(
    storage: MemoryStorage,
    fetcher: StaticFetcher,
    transformer: CountingTransformer<GifTransformer>,
) -> MockApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path());

    let storage = Arc::new(storage);
    let fetcher = Arc::new(fetcher);
    let transformer = Arc::new(transformer);
    let pipeline = PipelineOrchestrator::new(
        config.key_deriver(),
        storage.clone(),
        fetcher.clone(),
        transformer.clone(),
    );

    let dyn_storage: Arc<dyn Storage> = storage.clone();
    let state = Arc::new(AppState::new(dyn_storage, pipeline));
    let server = TestServer::new(setup_routes(state).into_make_service())
        .expect("Failed to create test server");

    MockApp {
        server,
        storage,
        fetcher,
        transformer,
        _temp_dir: temp_dir,
    }
}
