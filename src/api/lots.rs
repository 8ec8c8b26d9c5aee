use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use super::AppState;
use crate::domain::{
    AuctionLot, Bid, BidKey, DerivativeLot, DerivativeLotKey, EventRecord, LotInfo, LotKey,
    ModuleLot, Redemption,
};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LotResponse {
    pub lot: AuctionLot,
    pub module: Option<ModuleLot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivative: Option<DerivativeLot>,
    pub info: Vec<LotInfo>,
}

pub async fn get_lot(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LotResponse>, AppError> {
    let key = LotKey::from_raw(id);
    let lot = state
        .repo
        .get_lot(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("lot {}", key)))?;

    let module = state.repo.get_module_lot(&key).await?;
    let derivative = match &lot.derivative_lot {
        Some(derivative) => state.repo.get_derivative_lot(derivative).await?,
        None => None,
    };
    let info = state.repo.lot_infos_for(&key).await?;

    Ok(Json(LotResponse {
        lot,
        module,
        derivative,
        info,
    }))
}

pub async fn get_lot_bids(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Bid>>, AppError> {
    let key = LotKey::from_raw(id);
    require_lot(&state, &key).await?;
    Ok(Json(state.repo.bids_for_lot(&key).await?))
}

pub async fn get_lot_events(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<EventRecord>>, AppError> {
    let key = LotKey::from_raw(id);
    require_lot(&state, &key).await?;
    Ok(Json(state.repo.event_records_for_lot(&key).await?))
}

pub async fn get_bid(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Bid>, AppError> {
    let key = BidKey::from_raw(id);
    state
        .repo
        .get_bid(&key)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("bid {}", key)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionsResponse {
    pub derivative: DerivativeLot,
    pub redemptions: Vec<Redemption>,
}

pub async fn get_redemptions(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<RedemptionsResponse>, AppError> {
    let key = DerivativeLotKey::from_raw(id);
    let derivative = state
        .repo
        .get_derivative_lot(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("derivative lot {}", key)))?;
    let redemptions = state.repo.redemptions_for(&key).await?;
    Ok(Json(RedemptionsResponse {
        derivative,
        redemptions,
    }))
}

async fn require_lot(state: &AppState, key: &LotKey) -> Result<(), AppError> {
    match state.repo.get_lot(key).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!("lot {}", key))),
    }
}
