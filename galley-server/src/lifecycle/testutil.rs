//! Test fixtures for lifecycle tests

use crate::auth::Operator;
use crate::db::DbService;
use crate::db::repository::dining_table;
use crate::lifecycle::order_flow;
use shared::models::{
    DiningTable, DiningTableCreate, Order, OrderCreate, OrderDetail, OrderItemCreate, OrderStatus,
    PaymentMode, Role,
};
use sqlx::SqlitePool;

pub(crate) const VENUE: i64 = 1;

pub(crate) async fn setup() -> DbService {
    DbService::new_in_memory().await.expect("in-memory db")
}

fn operator(role: Role) -> Operator {
    Operator {
        venue_id: VENUE,
        operator_id: 100,
        operator_name: "Test Operator".to_string(),
        role,
    }
}

pub(crate) fn staff() -> Operator {
    operator(Role::Staff)
}

pub(crate) fn manager() -> Operator {
    operator(Role::Manager)
}

pub(crate) fn admin() -> Operator {
    operator(Role::Admin)
}

/// Seed a 4-seat table with a FREE session (the venue's opening state)
pub(crate) async fn seed_table(pool: &SqlitePool, venue_id: i64, label: &str) -> DiningTable {
    let table = dining_table::create(
        pool,
        venue_id,
        DiningTableCreate {
            label: label.to_string(),
            seat_count: Some(4),
        },
    )
    .await
    .expect("seed table");
    let session =
        crate::lifecycle::table_flow::new_session(venue_id, table.id, shared::models::SessionStatus::Free);
    crate::db::repository::table_session::insert(pool, &session)
        .await
        .expect("seed session");
    table
}

/// Place a two-line order (2 x 8.50 + 4.00 = 21.00) through the real path
pub(crate) async fn place_test_order(
    pool: &SqlitePool,
    op: &Operator,
    table_id: Option<i64>,
) -> OrderDetail {
    let data = OrderCreate {
        table_id,
        counter_label: table_id.is_none().then(|| "C1".to_string()),
        payment_mode: PaymentMode::PayLater,
        guest_count: Some(2),
        items: vec![
            OrderItemCreate {
                name: "Ramen".to_string(),
                quantity: 2,
                unit_price: 8.5,
                note: None,
            },
            OrderItemCreate {
                name: "Gyoza".to_string(),
                quantity: 1,
                unit_price: 4.0,
                note: Some("extra sauce".to_string()),
            },
        ],
    };
    order_flow::place_order(pool, op, data).await.expect("place order")
}

/// Place an order and hammer it into the given status directly (skipping
/// the guarded chain) for fixtures that only care about the end state.
pub(crate) async fn seed_dine_in_order(
    pool: &SqlitePool,
    op: &Operator,
    table_id: i64,
    status: OrderStatus,
) -> Order {
    let order = place_test_order(pool, op, Some(table_id)).await.order;
    if status != OrderStatus::Placed {
        sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
            .bind(status)
            .bind(order.id)
            .execute(pool)
            .await
            .expect("seed status");
    }
    crate::db::repository::order::find_by_id(pool, op.venue_id, order.id)
        .await
        .expect("reload")
        .expect("order exists")
}
