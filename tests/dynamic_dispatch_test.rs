use pagamento_console::domain::filter::FilterCriteria;
use pagamento_console::domain::payment::{NewPayment, PaymentMethod, PaymentStatus};
use pagamento_console::domain::ports::PaymentGatewayRef;
use pagamento_console::infrastructure::in_memory::InMemoryPaymentGateway;
use pagamento_console::infrastructure::timeout::TimeoutGateway;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_gateways_as_trait_objects() {
    let gateway: PaymentGatewayRef = Arc::new(TimeoutGateway::new(
        InMemoryPaymentGateway::new(),
        Duration::from_secs(1),
    ));

    let payment = NewPayment::with_payment_id(
        123456789,
        "12345678909",
        PaymentMethod::DebitCard,
        Some("5555-4444-3333-2222"),
        dec!(12.34),
    )
    .unwrap();

    // Verify Send + Sync by spawning tasks
    let writer = Arc::clone(&gateway);
    let created = tokio::spawn(async move {
        let created = writer.create_payment(&payment).await.unwrap();
        writer
            .set_status(created.payment_id, PaymentStatus::ProcessedFailure)
            .await
            .unwrap();
        created
    })
    .await
    .unwrap();
    assert_eq!(created.card_number.as_deref(), Some("5555444433332222"));

    let reader = Arc::clone(&gateway);
    let listed = tokio::spawn(async move {
        reader
            .fetch_payments(&FilterCriteria {
                status: Some(PaymentStatus::ProcessedFailure),
                ..Default::default()
            })
            .await
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, "PROCESSADO_FALHA");
}
