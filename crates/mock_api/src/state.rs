use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::http::{Method, StatusCode};
use upbreed_core::models::{
    Blog, Category, Course, DashboardData, Instructor, InstructorDetails, Transaction, Video,
};
use upbreed_core::types::ResourceId;

/// The mock's in-memory data set.
#[derive(Debug, Clone)]
pub struct Store {
    pub courses: Vec<Course>,
    pub videos: HashMap<ResourceId, Vec<Video>>,
    pub instructors: Vec<InstructorDetails>,
    pub categories: Vec<Category>,
    pub blogs: Vec<Blog>,
    pub transactions: Vec<Transaction>,
    pub dashboard: DashboardData,
    /// `(email, password)` pairs accepted by `POST /auth/login`.
    pub users: Vec<(String, String)>,
    next_id: ResourceId,
}

impl Store {
    pub fn empty() -> Self {
        Self {
            courses: Vec::new(),
            videos: HashMap::new(),
            instructors: Vec::new(),
            categories: Vec::new(),
            blogs: Vec::new(),
            transactions: Vec::new(),
            dashboard: DashboardData {
                total_subscribers: 0,
                total_users: 0,
                total_instructors: 0,
                total_reports: 0,
                total_revenue_usd: 0.0,
                subscribers_history: Vec::new(),
                revenue_history: Vec::new(),
            },
            users: Vec::new(),
            next_id: 1000,
        }
    }

    /// Id for a newly created record.
    pub fn allocate_id(&mut self) -> ResourceId {
        self.next_id += 1;
        self.next_id
    }

    /// Active instructors as list rows.
    pub fn active_instructors(&self) -> Vec<Instructor> {
        self.instructors
            .iter()
            .filter(|d| d.is_active)
            .map(instructor_row)
            .collect()
    }
}

pub(crate) fn instructor_row(details: &InstructorDetails) -> Instructor {
    Instructor {
        id: details.id,
        fname: details.fname.clone(),
        lname: details.lname.clone(),
        email: details.email.clone(),
        about: details.instructor_profile.about.clone(),
        created_at: details.created_at,
    }
}

// ---------------------------------------------------------------------------
// Request log & fault injection
// ---------------------------------------------------------------------------

/// One request as seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

impl RecordedRequest {
    /// Value of a query parameter, if present.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query.as_deref()?.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name).then(|| value.replace('+', " "))
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) enum FaultKind {
    Status(StatusCode),
    Delay(Duration),
}

#[derive(Debug, Clone)]
pub(crate) struct Fault {
    pub method: Method,
    pub path: String,
    pub kind: FaultKind,
    pub remaining: usize,
}

/// Shared state behind every mock handler.
#[derive(Clone)]
pub struct MockState {
    pub(crate) store: Arc<Mutex<Store>>,
    pub(crate) requests: Arc<Mutex<Vec<RecordedRequest>>>,
    pub(crate) faults: Arc<Mutex<Vec<Fault>>>,
    pub(crate) jwt_secret: Arc<String>,
}

impl MockState {
    pub fn new(store: Store) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            requests: Arc::new(Mutex::new(Vec::new())),
            faults: Arc::new(Mutex::new(Vec::new())),
            jwt_secret: Arc::new("mock-api-secret".to_string()),
        }
    }

    pub fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Number of requests for `method` on exactly `path`.
    pub fn hits(&self, method: &str, path: &str) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|r| r.method.as_str() == method && r.path == path)
            .count()
    }

    /// Number of requests of any method whose path starts with `prefix`.
    pub fn hits_under(&self, prefix: &str) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|r| r.path.starts_with(prefix))
            .count()
    }

    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }

    /// Answer the next `times` matching requests with `status`.
    pub fn fail_next(&self, method: &str, path: &str, status: u16, times: usize) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.push_fault(method, path, FaultKind::Status(status), times);
    }

    /// Hold the next `times` matching requests for `delay` before handling.
    pub fn delay_next(&self, method: &str, path: &str, delay: Duration, times: usize) {
        self.push_fault(method, path, FaultKind::Delay(delay), times);
    }

    fn push_fault(&self, method: &str, path: &str, kind: FaultKind, times: usize) {
        let method = Method::from_bytes(method.as_bytes()).unwrap_or(Method::GET);
        lock(&self.faults).push(Fault {
            method,
            path: path.to_string(),
            kind,
            remaining: times,
        });
    }

    pub(crate) fn record(&self, request: RecordedRequest) {
        lock(&self.requests).push(request);
    }

    /// Consume one matching fault, if any.
    pub(crate) fn take_fault(&self, method: &Method, path: &str) -> Option<FaultKind> {
        let mut faults = lock(&self.faults);
        let index = faults
            .iter()
            .position(|f| f.remaining > 0 && &f.method == method && f.path == path)?;
        let fault = &mut faults[index];
        fault.remaining -= 1;
        let kind = fault.kind.clone();
        if fault.remaining == 0 {
            faults.remove(index);
        }
        Some(kind)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
