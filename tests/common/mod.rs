//! In-process stand-in for the DCMS backend.
//!
//! Runs an axum server on a random local port with just enough of the API
//! for the client, the stores and the session handling to be exercised.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

use dcms_desk::{
    ApiClient, Config, SessionStore,
    agenda::parse_hhmm,
    models::{
        Appointment, AppointmentStatus, Payment, PaymentStatus, Quotation, QuotationStatus,
        calendar_date,
    },
    stores::{
        patient_store::Patient,
        sale_store::{Sale, SaleStatus},
    },
};

pub const TOKEN: &str = "tok-front-desk";
pub const PASSWORD: &str = "s3cret";

#[derive(Default)]
pub struct Backend {
    pub patients: RwLock<Vec<Patient>>,
    pub quotations: RwLock<Vec<Quotation>>,
    pub payments: RwLock<Vec<Payment>>,
    pub appointments: RwLock<Vec<Appointment>>,
    pub sales: RwLock<Vec<Sale>>,
    /// Every request that reached a handler.
    pub requests: AtomicUsize,
    pub payment_posts: AtomicUsize,
}

pub struct MockBackend {
    pub state: Arc<Backend>,
    addr: SocketAddr,
    _handle: JoinHandle<()>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(Backend::default());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");

        let api = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/me", get(me))
            .route("/auth/logout", post(logout))
            .route("/patients", get(list_patients).post(create_patient))
            .route(
                "/patients/{id}",
                get(get_patient).patch(patch_patient).delete(delete_patient),
            )
            .route("/doctors", get(slow_doctors))
            .route("/employees", get(expired_session))
            .route("/quotations", get(list_quotations))
            .route("/quotations/{id}", get(get_quotation).patch(patch_quotation))
            .route("/payments", get(list_payments).post(create_payment))
            .route("/payments/{id}", patch(patch_payment))
            .route("/sales", get(list_sales))
            .route("/sales/{id}/{action}", post(sale_action))
            .route("/appointments", get(list_appointments).post(create_appointment))
            .route("/appointments/{id}/{action}", post(appointment_action))
            .with_state(state.clone());

        let app = Router::new().nest("/api/v1", api);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend failed");
        });

        Self {
            state,
            addr,
            _handle: handle,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    pub fn config(&self) -> Config {
        Config::default().with_api_url(self.url())
    }

    /// Anonymous client with an in-memory session.
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.config(), SessionStore::in_memory()).expect("client")
    }

    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    pub fn payment_posts(&self) -> usize {
        self.state.payment_posts.load(Ordering::SeqCst)
    }

    pub async fn seed_patient(&self, first: &str, last: &str) -> Patient {
        let p = Patient {
            id: Uuid::new_v4(),
            register_number: None,
            first_name: first.into(),
            last_name: last.into(),
            document_number: None,
            phone: None,
            email: None,
            birthday: None,
            created_at: Some(Utc::now()),
        };
        self.state.patients.write().await.push(p.clone());
        p
    }

    pub async fn seed_quotation(&self, total_cents: i64, status: QuotationStatus) -> Quotation {
        let q = Quotation {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            created_at: Utc::now(),
            status,
            total_cents,
            items: vec![],
        };
        self.state.quotations.write().await.push(q.clone());
        q
    }

    pub async fn seed_payment(
        &self,
        quotation_id: Uuid,
        amount_cents: i64,
        status: PaymentStatus,
    ) -> Payment {
        let p = Payment {
            id: Uuid::new_v4(),
            quotation_id,
            amount_cents,
            payment_date: Utc::now().date_naive(),
            status,
            method_id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
        };
        self.state.payments.write().await.push(p.clone());
        p
    }

    pub async fn seed_sale(&self, total_cents: i64, status: SaleStatus) -> Sale {
        let sale = Sale {
            id: Uuid::new_v4(),
            patient_id: None,
            items: vec![],
            total_cents,
            status,
            invoice_number: None,
            created_at: Utc::now(),
        };
        self.state.sales.write().await.push(sale.clone());
        sale
    }

    pub async fn seed_appointment(
        &self,
        date: NaiveDate,
        start: (u32, u32),
        end: (u32, u32),
        doctor_id: Uuid,
    ) -> Appointment {
        let a = Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id,
            service_id: Uuid::new_v4(),
            date,
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).expect("start"),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).expect("end"),
            status: AppointmentStatus::Scheduled,
            notes: None,
        };
        self.state.appointments.write().await.push(a.clone());
        a
    }
}

fn hit(b: &Backend) {
    b.requests.fetch_add(1, Ordering::SeqCst);
}

fn data(value: impl serde::Serialize) -> Json<Value> {
    Json(json!({ "data": value }))
}

fn nested_error(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "code": code, "message": message } })),
    )
        .into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

/* -------------------------
   Auth
--------------------------*/

async fn login(State(b): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    hit(&b);
    if body["password"] != PASSWORD {
        return nested_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Invalid credentials");
    }
    data(json!({
        "access_token": TOKEN,
        "expires_at": Utc::now() + chrono::Duration::hours(12),
        "dcms_user": {
            "user_id": Uuid::new_v4(),
            "username": body["username"],
            "display_name": "Front Desk",
            "roles": ["4"],
        },
        "clinic": { "clinic_name": "Sonrisa Dental" },
    }))
    .into_response()
}

async fn me(State(b): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    hit(&b);
    if !authorized(&headers) {
        return nested_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Invalid session");
    }
    data(json!({
        "dcms_user": {
            "user_id": Uuid::nil(),
            "username": "desk",
            "display_name": "Front Desk",
            "roles": ["4"],
        },
        "clinic": { "clinic_name": "Sonrisa Dental" },
    }))
    .into_response()
}

async fn logout(State(b): State<Arc<Backend>>) -> StatusCode {
    hit(&b);
    StatusCode::NO_CONTENT
}

async fn expired_session(State(b): State<Arc<Backend>>) -> Response {
    hit(&b);
    nested_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Session expired")
}

async fn slow_doctors(State(b): State<Arc<Backend>>) -> Json<Value> {
    hit(&b);
    tokio::time::sleep(Duration::from_secs(2)).await;
    data(Vec::<Value>::new())
}

/* -------------------------
   Patients
--------------------------*/

async fn list_patients(
    State(b): State<Arc<Backend>>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Value> {
    hit(&b);
    let query = q.get("query").map(|s| s.to_lowercase());
    // "slow" answers late with the whole list
    if query.as_deref() == Some("slow") {
        tokio::time::sleep(Duration::from_millis(300)).await;
        return data(b.patients.read().await.clone());
    }
    let patients: Vec<Patient> = b
        .patients
        .read()
        .await
        .iter()
        .filter(|p| {
            query
                .as_deref()
                .is_none_or(|q| p.display_name().to_lowercase().contains(q))
        })
        .cloned()
        .collect();
    data(patients)
}

async fn create_patient(State(b): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    hit(&b);
    let text = |key: &str| body[key].as_str().map(str::to_string);
    let p = Patient {
        id: Uuid::new_v4(),
        register_number: Some(format!("HC-{:04}", b.patients.read().await.len() + 1)),
        first_name: text("first_name").unwrap_or_default(),
        last_name: text("last_name").unwrap_or_default(),
        document_number: text("document_number"),
        phone: text("phone"),
        email: text("email"),
        birthday: None,
        created_at: Some(Utc::now()),
    };
    b.patients.write().await.push(p.clone());
    (StatusCode::CREATED, data(p)).into_response()
}

async fn get_patient(State(b): State<Arc<Backend>>, Path(id): Path<Uuid>) -> Response {
    hit(&b);
    match b.patients.read().await.iter().find(|p| p.id == id) {
        Some(p) => data(p).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Patient not found" })),
        )
            .into_response(),
    }
}

async fn patch_patient(
    State(b): State<Arc<Backend>>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Response {
    hit(&b);
    let mut patients = b.patients.write().await;
    let Some(p) = patients.iter_mut().find(|p| p.id == id) else {
        return nested_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Patient not found");
    };
    if let Some(phone) = body["phone"].as_str() {
        p.phone = Some(phone.to_string());
    }
    if let Some(email) = body["email"].as_str() {
        p.email = Some(email.to_string());
    }
    data(p.clone()).into_response()
}

async fn delete_patient(State(b): State<Arc<Backend>>, Path(id): Path<Uuid>) -> StatusCode {
    hit(&b);
    b.patients.write().await.retain(|p| p.id != id);
    StatusCode::NO_CONTENT
}

/* -------------------------
   Billing
--------------------------*/

async fn list_quotations(State(b): State<Arc<Backend>>) -> Json<Value> {
    hit(&b);
    data(b.quotations.read().await.clone())
}

async fn get_quotation(State(b): State<Arc<Backend>>, Path(id): Path<Uuid>) -> Response {
    hit(&b);
    match b.quotations.read().await.iter().find(|q| q.id == id) {
        Some(q) => data(q).into_response(),
        None => nested_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Quotation not found"),
    }
}

async fn patch_quotation(
    State(b): State<Arc<Backend>>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Response {
    hit(&b);
    let mut quotations = b.quotations.write().await;
    let Some(q) = quotations.iter_mut().find(|q| q.id == id) else {
        return nested_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Quotation not found");
    };
    if let Ok(status) = serde_json::from_value::<QuotationStatus>(body["status"].clone()) {
        q.status = status;
    }
    data(q.clone()).into_response()
}

async fn list_payments(
    State(b): State<Arc<Backend>>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Value> {
    hit(&b);
    let wanted = q.get("quotation_id").and_then(|s| s.parse::<Uuid>().ok());
    let payments: Vec<Payment> = b
        .payments
        .read()
        .await
        .iter()
        .filter(|p| wanted.is_none_or(|id| p.quotation_id == id))
        .cloned()
        .collect();
    data(payments)
}

async fn create_payment(State(b): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    hit(&b);
    b.payment_posts.fetch_add(1, Ordering::SeqCst);

    let Ok(mut payment) = serde_json::from_value::<Payment>(json!({
        "id": Uuid::new_v4(),
        "quotation_id": body["quotation_id"],
        "amount_cents": body["amount_cents"],
        "payment_date": body["payment_date"],
        "status": "confirmed",
        "method_id": body["method_id"],
        "created_by": body["created_by"],
    })) else {
        return nested_error(StatusCode::BAD_REQUEST, "BAD_REQUEST", "Malformed payment");
    };
    payment.status = PaymentStatus::Confirmed;
    b.payments.write().await.push(payment.clone());
    (StatusCode::CREATED, data(payment)).into_response()
}

async fn patch_payment(
    State(b): State<Arc<Backend>>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Response {
    hit(&b);
    let mut payments = b.payments.write().await;
    let Some(p) = payments.iter_mut().find(|p| p.id == id) else {
        return nested_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Payment not found");
    };
    if let Ok(status) = serde_json::from_value::<PaymentStatus>(body["status"].clone()) {
        p.status = status;
    }
    data(p.clone()).into_response()
}

/* -------------------------
   Sales
--------------------------*/

async fn list_sales(State(b): State<Arc<Backend>>) -> Json<Value> {
    hit(&b);
    data(b.sales.read().await.clone())
}

async fn sale_action(
    State(b): State<Arc<Backend>>,
    Path((id, action)): Path<(Uuid, String)>,
) -> Response {
    hit(&b);
    let mut sales = b.sales.write().await;
    let Some(sale) = sales.iter_mut().find(|s| s.id == id) else {
        return nested_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Sale not found");
    };
    match action.as_str() {
        "complete" => sale.status = SaleStatus::Completed,
        "cancel" => sale.status = SaleStatus::Cancelled,
        "refund" => sale.status = SaleStatus::Refunded,
        "invoice" => sale.invoice_number = Some("B001-0001".into()),
        _ => return nested_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Unknown action"),
    }
    data(sale.clone()).into_response()
}

/* -------------------------
   Appointments
--------------------------*/

async fn list_appointments(State(b): State<Arc<Backend>>) -> Json<Value> {
    hit(&b);
    data(b.appointments.read().await.clone())
}

async fn create_appointment(State(b): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    hit(&b);
    let mut fields = body.clone();
    fields["id"] = json!(Uuid::new_v4());
    fields["status"] = json!("scheduled");
    match serde_json::from_value::<Appointment>(fields) {
        Ok(a) => {
            b.appointments.write().await.push(a.clone());
            (StatusCode::CREATED, data(a)).into_response()
        }
        Err(e) => nested_error(StatusCode::BAD_REQUEST, "BAD_REQUEST", &e.to_string()),
    }
}

async fn appointment_action(
    State(b): State<Arc<Backend>>,
    Path((id, action)): Path<(Uuid, String)>,
    Json(body): Json<Value>,
) -> Response {
    hit(&b);
    let mut appointments = b.appointments.write().await;
    let Some(a) = appointments.iter_mut().find(|a| a.id == id) else {
        return nested_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Appointment not found");
    };
    a.status = match action.as_str() {
        "confirm" => AppointmentStatus::Scheduled,
        "complete" => AppointmentStatus::Completed,
        "cancel" => AppointmentStatus::Cancelled,
        "no_show" => AppointmentStatus::NoShow,
        "reschedule" => {
            let date = body["date"].as_str().and_then(calendar_date::parse);
            let start = body["start_time"].as_str().and_then(|t| parse_hhmm(t).ok());
            let end = body["end_time"].as_str().and_then(|t| parse_hhmm(t).ok());
            let (Some(date), Some(start), Some(end)) = (date, start, end) else {
                return nested_error(StatusCode::BAD_REQUEST, "BAD_REQUEST", "Malformed slot");
            };
            a.date = date;
            a.start_time = start;
            a.end_time = end;
            a.status
        }
        _ => return nested_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Unknown action"),
    };
    data(a.clone()).into_response()
}
