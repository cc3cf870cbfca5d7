use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::{CreateOrderRequest, OrderStatus, UpdateStatusRequest};
use crate::routes::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Response, AppError> {
    let order = state
        .orders
        .create_order(req.usuario_id, &req.boleto_ids)
        .await?;
    Ok(created(order, "Order created").into_response())
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let order = state.orders.get_order(id).await?;
    Ok(success(order, "Order retrieved").into_response())
}

pub async fn list_orders(State(state): State<AppState>) -> Result<Response, AppError> {
    let orders = state.orders.list_all().await?;
    Ok(success(orders, "Orders retrieved").into_response())
}

pub async fn list_orders_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Response, AppError> {
    let orders = state.orders.list_by_user(user_id).await?;
    Ok(success(orders, "Orders retrieved").into_response())
}

pub async fn list_orders_by_status(
    State(state): State<AppState>,
    Path(estado): Path<String>,
) -> Result<Response, AppError> {
    let status: OrderStatus = estado.parse().map_err(AppError::Validation)?;
    let orders = state.orders.list_by_status(status).await?;
    Ok(success(orders, "Orders retrieved").into_response())
}

pub async fn order_stats(State(state): State<AppState>) -> Result<Response, AppError> {
    let stats = state.orders.stats().await?;
    Ok(success(stats, "Order statistics computed").into_response())
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Response, AppError> {
    let target: OrderStatus = req.estado.parse().map_err(AppError::Validation)?;
    let order = state.orders.update_status(id, target).await?;
    Ok(success(order, "Order status updated").into_response())
}

pub async fn pay_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let order = state.orders.pay(id).await?;
    Ok(success(order, "Order paid").into_response())
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let order = state.orders.cancel(id).await?;
    Ok(success(order, "Order cancelled").into_response())
}

pub async fn refund_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let order = state.orders.refund(id).await?;
    Ok(success(order, "Order refunded").into_response())
}

pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    state.orders.delete_order(id).await?;
    Ok(empty_success("Order deleted").into_response())
}
