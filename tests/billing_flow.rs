mod common;

use chrono::Utc;
use common::MockBackend;
use dcms_desk::{
    ApiError, ValidationError,
    billing::{BalanceStatus, outstanding},
    models::{PaymentStatus, Quotation, QuotationStatus},
    stores::{
        Store,
        payment_store::{PaymentDraft, PaymentFilter, PaymentStore},
        quotation_store::QuotationStore,
        sale_store::{SaleStatus, SaleStore},
    },
};
use uuid::Uuid;

fn payment(quotation_id: Uuid, amount_cents: i64) -> PaymentDraft {
    PaymentDraft {
        quotation_id,
        amount_cents,
        payment_date: Utc::now().date_naive(),
        method_id: Uuid::new_v4(),
        created_by: Uuid::new_v4(),
    }
}

async fn loaded_payments(backend: &MockBackend, quotation: &Quotation) -> PaymentStore {
    let store = PaymentStore::new(backend.client());
    assert!(
        store
            .search(PaymentFilter {
                quotation_id: Some(quotation.id),
                ..Default::default()
            })
            .await
    );
    store
}

#[tokio::test]
async fn payment_over_pending_is_blocked_then_exact_amount_settles() {
    let backend = MockBackend::start().await;
    let q = backend.seed_quotation(85_000, QuotationStatus::Accepted).await;
    backend.seed_payment(q.id, 50_000, PaymentStatus::Confirmed).await;
    backend.seed_payment(q.id, 20_000, PaymentStatus::Voided).await;

    let payments = loaded_payments(&backend, &q).await;
    let before = payments.balance_of(&q).await;
    assert_eq!(before.pending, 35_000);
    assert_eq!(before.status(), BalanceStatus::Partial);

    assert!(payments.register(&q, payment(q.id, 40_000)).await.is_none());
    assert_eq!(
        payments.take_error().await,
        Some(ApiError::Validation(ValidationError::ExceedsPending {
            amount: 40_000,
            pending: 35_000,
        }))
    );
    assert_eq!(backend.payment_posts(), 0);

    let paid = payments.register(&q, payment(q.id, 35_000)).await.unwrap();
    assert_eq!(paid.status, PaymentStatus::Confirmed);
    assert_eq!(backend.payment_posts(), 1);

    let after = payments.balance_of(&q).await;
    assert_eq!(after.pending, 0);
    assert_eq!(after.status(), BalanceStatus::Paid);
}

#[tokio::test]
async fn void_quotation_takes_no_payments() {
    let backend = MockBackend::start().await;
    let q = backend.seed_quotation(10_000, QuotationStatus::Void).await;
    let payments = loaded_payments(&backend, &q).await;

    assert!(payments.register(&q, payment(q.id, 1_000)).await.is_none());
    assert_eq!(
        payments.error().await,
        Some(ApiError::Validation(ValidationError::QuotationVoid))
    );
    assert_eq!(backend.payment_posts(), 0);
}

#[tokio::test]
async fn zero_amount_is_rejected() {
    let backend = MockBackend::start().await;
    let q = backend.seed_quotation(10_000, QuotationStatus::Pending).await;
    let payments = loaded_payments(&backend, &q).await;

    assert!(payments.register(&q, payment(q.id, 0)).await.is_none());
    assert_eq!(
        payments.error().await,
        Some(ApiError::Validation(ValidationError::NonPositiveAmount))
    );
}

#[tokio::test]
async fn outstanding_lists_open_balances_from_both_stores() {
    let backend = MockBackend::start().await;
    let open = backend.seed_quotation(85_000, QuotationStatus::Accepted).await;
    let settled = backend.seed_quotation(20_000, QuotationStatus::Accepted).await;
    backend.seed_quotation(99_000, QuotationStatus::Void).await;
    backend.seed_payment(open.id, 10_000, PaymentStatus::Confirmed).await;
    backend.seed_payment(settled.id, 20_000, PaymentStatus::Confirmed).await;

    let client = backend.client();
    let quotations: Store<Quotation> = Store::new(client.clone());
    let payments = PaymentStore::new(client);
    assert!(quotations.fetch_all().await);
    assert!(payments.fetch_all().await);

    let balances = outstanding(&quotations.items().await, &payments.items().await);
    assert_eq!(balances.len(), 1);
    assert_eq!(balances[0].quotation_id, open.id);
    assert_eq!(balances[0].pending, 75_000);
}

#[tokio::test]
async fn voiding_a_payment_reopens_the_balance() {
    let backend = MockBackend::start().await;
    let q = backend.seed_quotation(85_000, QuotationStatus::Accepted).await;
    backend.seed_payment(q.id, 50_000, PaymentStatus::Confirmed).await;
    let last = backend.seed_payment(q.id, 35_000, PaymentStatus::Confirmed).await;

    let payments = loaded_payments(&backend, &q).await;
    assert_eq!(payments.balance_of(&q).await.status(), BalanceStatus::Paid);

    let voided = payments.void(last.id).await.unwrap();
    assert_eq!(voided.status, PaymentStatus::Voided);

    let after = payments.balance_of(&q).await;
    assert_eq!((after.paid, after.pending), (50_000, 35_000));
    assert_eq!(after.status(), BalanceStatus::Partial);
}

#[tokio::test]
async fn quotation_status_changes_follow_the_rules() {
    let backend = MockBackend::start().await;
    let open = backend.seed_quotation(10_000, QuotationStatus::Pending).await;
    let paid = backend.seed_quotation(20_000, QuotationStatus::Paid).await;

    let quotations = QuotationStore::new(backend.client());
    assert!(quotations.fetch_all().await);

    let accepted = quotations.accept(open.id).await.unwrap();
    assert_eq!(accepted.status, QuotationStatus::Accepted);

    let before = backend.requests();
    assert!(quotations.accept(open.id).await.is_none());
    let err = quotations.take_error().await.unwrap();
    assert_eq!(err.to_string(), "cannot accept quotation: it is accepted");

    assert!(quotations.void(paid.id).await.is_none());
    assert!(matches!(
        quotations.take_error().await,
        Some(ApiError::Validation(ValidationError::IllegalTransition { .. }))
    ));
    assert_eq!(backend.requests(), before);

    let voided = quotations.void(open.id).await.unwrap();
    assert_eq!(voided.status, QuotationStatus::Void);
    assert_eq!(
        quotations.find(open.id).await.unwrap().status,
        QuotationStatus::Void
    );
}

#[tokio::test]
async fn sale_actions_go_through_the_store() {
    let backend = MockBackend::start().await;
    let sale = backend.seed_sale(6_490, SaleStatus::Pending).await;
    let other = backend.seed_sale(1_000, SaleStatus::Pending).await;

    let sales = SaleStore::new(backend.client());
    assert!(sales.fetch_all().await);
    let before = backend.requests();

    assert!(sales.refund(sale.id).await.is_none());
    assert_eq!(
        sales.take_error().await.unwrap().to_string(),
        "cannot refund sale: it is pending"
    );
    assert_eq!(backend.requests(), before);

    let done = sales.complete_sale(sale.id).await.unwrap();
    assert_eq!(done.status, SaleStatus::Completed);

    let invoiced = sales.generate_invoice(sale.id).await.unwrap();
    assert_eq!(invoiced.invoice_number.as_deref(), Some("B001-0001"));
    assert!(sales.generate_invoice(sale.id).await.is_none());
    assert_eq!(
        sales.take_error().await.unwrap().to_string(),
        "cannot invoice sale: it is already invoiced"
    );

    let refunded = sales.refund(sale.id).await.unwrap();
    assert_eq!(refunded.status, SaleStatus::Refunded);
    assert!(sales.cancel_sale(sale.id).await.is_none());

    let cancelled = sales.cancel_sale(other.id).await.unwrap();
    assert_eq!(cancelled.status, SaleStatus::Cancelled);
    assert_eq!(sales.find(other.id).await.unwrap().status, SaleStatus::Cancelled);
}
