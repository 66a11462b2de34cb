//! A full dine-in service day against an on-disk database: seat, order,
//! kitchen, payment, completion, reservations, and the end-of-day reset.

use galley_server::db::repository::{reservation, table_session};
use galley_server::lifecycle::{kitchen, order_flow, reservation_flow, reset, table_flow};
use galley_server::{DbService, Operator};
use shared::models::{
    BulkTicketUpdate, CompleteOrderRequest, CompletionReason, DiningTableCreate, OrderCreate,
    OrderItemCreate, OrderStatus, OrderStatusUpdate, PaymentMode, PaymentStatus, ReservationCreate,
    ReservationStatus, Role, SessionStatus, TicketStatus,
};
use shared::util::now_millis;

const VENUE: i64 = 1;

fn operator(role: Role) -> Operator {
    Operator {
        venue_id: VENUE,
        operator_id: 42,
        operator_name: "Integration".to_string(),
        role,
    }
}

async fn open_db(dir: &tempfile::TempDir) -> DbService {
    let path = dir.path().join("galley-test.db");
    DbService::new(path.to_str().expect("utf-8 temp path"))
        .await
        .expect("open on-disk database")
}

fn two_course_order(table_id: i64) -> OrderCreate {
    OrderCreate {
        table_id: Some(table_id),
        counter_label: None,
        payment_mode: PaymentMode::PayLater,
        guest_count: Some(2),
        items: vec![
            OrderItemCreate {
                name: "Seabass".into(),
                quantity: 1,
                unit_price: 18.5,
                note: None,
            },
            OrderItemCreate {
                name: "House red".into(),
                quantity: 2,
                unit_price: 6.25,
                note: Some("with the main".into()),
            },
        ],
    }
}

#[tokio::test]
async fn full_dine_in_service_day() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = open_db(&dir).await;
    let staff = operator(Role::Staff);
    let admin = operator(Role::Admin);

    // Morning setup: two tables on the floor, both FREE
    let t5 = table_flow::create_table(
        &db.pool,
        &staff,
        DiningTableCreate {
            label: "5".into(),
            seat_count: Some(4),
        },
    )
    .await
    .unwrap();
    let t6 = table_flow::create_table(
        &db.pool,
        &staff,
        DiningTableCreate {
            label: "6".into(),
            seat_count: Some(2),
        },
    )
    .await
    .unwrap();

    // A reservation comes in for the evening and the party is seated at 6
    let now = now_millis();
    let booking = reservation_flow::book_reservation(
        &db.pool,
        &staff,
        ReservationCreate {
            customer_name: "Okafor".into(),
            party_size: 2,
            start_at: now,
            end_at: now + 2 * 3_600_000,
            table_id: None,
        },
    )
    .await
    .unwrap();
    reservation_flow::check_in_reservation(&db.pool, &staff, booking.id, t6.table.id)
        .await
        .unwrap();

    // The party orders; the kitchen runs it across two stations
    let detail = order_flow::place_order(&db.pool, &staff, two_course_order(t6.table.id))
        .await
        .unwrap();
    let order_id = detail.order.id;
    assert_eq!(detail.order.total_amount, 31.0);
    assert_eq!(detail.order.payment_status, PaymentStatus::Unpaid);

    for (status, stations) in [
        (OrderStatus::Accepted, None),
        (OrderStatus::InPrep, Some(vec!["grill".into(), "bar".into()])),
    ] {
        order_flow::update_status(
            &db.pool,
            &staff,
            order_id,
            OrderStatusUpdate { status, stations },
        )
        .await
        .unwrap();
    }

    let tickets = kitchen::list_for_order(&db.pool, VENUE, order_id).await.unwrap();
    assert_eq!(tickets.len(), 2);

    // First station bumps: order still IN_PREP
    let partial = kitchen::bulk_update_tickets(
        &db.pool,
        &staff,
        BulkTicketUpdate {
            ticket_ids: vec![tickets[0].id],
            status: TicketStatus::Bumped,
            order_id: Some(order_id),
        },
    )
    .await
    .unwrap();
    assert!(!partial.order_ready);

    // Second station bumps: order goes READY
    let done = kitchen::bulk_update_tickets(
        &db.pool,
        &staff,
        BulkTicketUpdate {
            ticket_ids: vec![tickets[1].id],
            status: TicketStatus::Bumped,
            order_id: Some(order_id),
        },
    )
    .await
    .unwrap();
    assert!(done.order_ready);

    // Serve, collect payment, complete; the table frees up
    order_flow::update_status(
        &db.pool,
        &staff,
        order_id,
        OrderStatusUpdate {
            status: OrderStatus::Serving,
            stations: None,
        },
    )
    .await
    .unwrap();
    order_flow::mark_paid(&db.pool, &staff, order_id, "card").await.unwrap();
    let completed = order_flow::complete_order(
        &db.pool,
        &staff,
        order_id,
        CompleteOrderRequest::default(),
    )
    .await
    .unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);
    assert_eq!(completed.payment_status, PaymentStatus::Paid);

    let session = table_session::find_open_by_table(&db.pool, VENUE, t6.table.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.status, SessionStatus::Free);

    // The sweep now closes the reservation for the settled table
    let summary = reservation_flow::auto_complete_reservations(&db.pool, &staff)
        .await
        .unwrap();
    assert_eq!(summary.payment_completed, 1);
    let booking = reservation::find_by_id(&db.pool, VENUE, booking.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(booking.status, ReservationStatus::Completed);
    assert_eq!(booking.completed_reason, Some(CompletionReason::PaymentCompleted));

    // A late walk-in order is still open at close
    let late = order_flow::place_order(&db.pool, &staff, two_course_order(t5.table.id))
        .await
        .unwrap();

    // End of day: the admin sweeps the venue
    let reset = reset::daily_reset(&db.pool, &admin, false).await.unwrap();
    assert_eq!(reset.completed_orders, 1);
    assert_eq!(reset.deleted_tables, 2);
    assert!(reset.errors.is_empty());

    // The late order survives as a forced COMPLETED record
    let late = order_flow::get_order(&db.pool, VENUE, late.order.id).await.unwrap();
    assert_eq!(late.order.status, OrderStatus::Completed);
    assert!(late.order.forced);

    // The floor is empty and ready to be recreated tomorrow
    let floor = table_flow::list_tables(&db.pool, VENUE).await.unwrap();
    assert!(floor.is_empty());
}

#[tokio::test]
async fn merge_serve_unmerge_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = open_db(&dir).await;
    let staff = operator(Role::Staff);

    let t8 = table_flow::create_table(
        &db.pool,
        &staff,
        DiningTableCreate {
            label: "8".into(),
            seat_count: Some(4),
        },
    )
    .await
    .unwrap();
    let t9 = table_flow::create_table(
        &db.pool,
        &staff,
        DiningTableCreate {
            label: "9".into(),
            seat_count: Some(4),
        },
    )
    .await
    .unwrap();

    // A party of eight: merge, serve a full order on the merged table
    let pair = galley_server::lifecycle::merge::merge_tables(&db.pool, &staff, t8.table.id, t9.table.id)
        .await
        .unwrap();
    assert_eq!(pair.primary.label, "8+9");
    assert_eq!(pair.primary.seat_count, 8);

    let detail = order_flow::place_order(&db.pool, &staff, two_course_order(t8.table.id))
        .await
        .unwrap();
    for status in [
        OrderStatus::Accepted,
        OrderStatus::InPrep,
        OrderStatus::Ready,
        OrderStatus::Serving,
    ] {
        order_flow::update_status(
            &db.pool,
            &staff,
            detail.order.id,
            OrderStatusUpdate {
                status,
                stations: None,
            },
        )
        .await
        .unwrap();
    }
    order_flow::mark_paid(&db.pool, &staff, detail.order.id, "cash").await.unwrap();
    order_flow::complete_order(
        &db.pool,
        &staff,
        detail.order.id,
        CompleteOrderRequest::default(),
    )
    .await
    .unwrap();

    // Split the tables again: labels, seats, and FREE sessions restored
    let pair = galley_server::lifecycle::merge::unmerge_table(&db.pool, &staff, t9.table.id)
        .await
        .unwrap();
    assert_eq!(pair.primary.label, "8");
    assert_eq!(pair.primary.seat_count, 4);
    assert_eq!(pair.secondary.label, "9");
    assert!(pair.secondary.merged_with_table_id.is_none());

    for id in [t8.table.id, t9.table.id] {
        let session = table_session::find_open_by_table(&db.pool, VENUE, id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.status, SessionStatus::Free);
    }
}
