use crate::{
    auction::{BidSubmission, LotId, Receipt},
    session::{LoadError, LotView, Session},
    source::SharedCatalogSource,
};
use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, future::Future, net::SocketAddr, sync::Arc};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::submission::{SubmissionController, SubmitError};

/// Everything one operator's UI works against
pub struct App {
    source: SharedCatalogSource,
    session: Option<Session>,
    controller: SubmissionController,
}

pub type SharedApp = Arc<Mutex<App>>;

impl App {
    pub fn new(
        source: SharedCatalogSource,
        session: Option<Session>,
        controller: SubmissionController,
    ) -> Self {
        Self {
            source,
            session,
            controller,
        }
    }

    pub fn new_shared(
        source: SharedCatalogSource,
        session: Option<Session>,
        controller: SubmissionController,
    ) -> SharedApp {
        Arc::new(Mutex::new(Self::new(source, session, controller)))
    }
}

/// Load the session if an earlier attempt failed
async fn ensure_loaded<'s>(
    session: &'s mut Option<Session>,
    source: &SharedCatalogSource,
) -> Result<&'s mut Session, ApiError> {
    let loaded = match session.take() {
        Some(loaded) => loaded,
        None => Session::load(&**source).await?,
    };
    Ok(session.insert(loaded))
}

#[derive(Debug)]
enum ApiError {
    NotLoaded(LoadError),
    UnknownLot(LotId),
    Submit(SubmitError),
}

impl From<LoadError> for ApiError {
    fn from(e: LoadError) -> Self {
        ApiError::NotLoaded(e)
    }
}

impl From<SubmitError> for ApiError {
    fn from(e: SubmitError) -> Self {
        ApiError::Submit(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct ValidationBody {
    errors: BTreeMap<&'static str, String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message_response = |status: StatusCode, message: String| {
            (status, Json(ErrorBody { error: message })).into_response()
        };

        match self {
            ApiError::NotLoaded(e) => {
                let message = e.user_message();
                error!(error = ?anyhow::Error::from(e), "error initializing data");
                message_response(StatusCode::SERVICE_UNAVAILABLE, message.to_owned())
            }
            ApiError::UnknownLot(lot) => {
                message_response(StatusCode::NOT_FOUND, format!("unknown lot: {lot}"))
            }
            ApiError::Submit(SubmitError::Validation(errors)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationBody {
                    errors: errors
                        .iter()
                        .map(|e| (e.field().form_name(), e.to_string()))
                        .collect(),
                }),
            )
                .into_response(),
            ApiError::Submit(SubmitError::Submission(e)) => {
                let message = e.user_message();
                warn!(error = ?anyhow::Error::from(e), "bid not recorded");
                message_response(StatusCode::BAD_GATEWAY, message.to_owned())
            }
        }
    }
}

#[derive(Serialize)]
struct LotsBody<'a> {
    lots: &'a [LotId],
}

#[derive(Debug, Serialize)]
struct LotViewBody {
    lot: LotId,
    image: Option<String>,
    current_bid: u64,
    suggested_bid: u64,
    prompt: String,
}

impl From<LotView> for LotViewBody {
    fn from(view: LotView) -> Self {
        Self {
            prompt: view.prompt.to_string(),
            lot: view.lot,
            image: view.image,
            current_bid: view.current_bid,
            suggested_bid: view.suggested_bid,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BidForm {
    sale_lot: String,
    bidder_name: String,
    bidding_number: String,
    bid_amount: String,
}

impl From<BidForm> for BidSubmission {
    fn from(form: BidForm) -> Self {
        Self {
            lot: form.sale_lot,
            bidder_name: form.bidder_name,
            bidder_number: form.bidding_number,
            amount: leading_integer(&form.bid_amount),
        }
    }
}

/// Integer prefix of a form value, so "500.0" and "500 dollars" read as 500
///
/// `None` when there are no digits up front or the number doesn't fit an `i64`.
pub fn leading_integer(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let sign_len = usize::from(value.starts_with(['+', '-']));
    let digits_len = value[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    value[..sign_len + digits_len].parse().ok()
}

#[derive(Serialize)]
struct NotificationBody {
    message: String,
    dismiss_after_ms: u64,
}

#[derive(Serialize)]
struct BidAcceptedBody {
    receipt: Receipt,
    notification: NotificationBody,
    reset_form: bool,
}

async fn list_lots(State(app): State<SharedApp>) -> Result<Response, ApiError> {
    let mut app = app.lock().await;
    let App { source, session, .. } = &mut *app;
    let session = ensure_loaded(session, source).await?;

    Ok(Json(LotsBody {
        lots: session.catalog.lots(),
    })
    .into_response())
}

async fn show_lot(
    State(app): State<SharedApp>,
    Path(lot): Path<LotId>,
) -> Result<Json<LotViewBody>, ApiError> {
    let mut app = app.lock().await;
    let App { source, session, .. } = &mut *app;
    let session = ensure_loaded(session, source).await?;

    session
        .view(&lot)
        .map(|view| Json(view.into()))
        .ok_or(ApiError::UnknownLot(lot))
}

async fn submit_bid(
    State(app): State<SharedApp>,
    Form(form): Form<BidForm>,
) -> Result<Json<BidAcceptedBody>, ApiError> {
    let mut app = app.lock().await;
    let App {
        source,
        session,
        controller,
    } = &mut *app;
    let session = ensure_loaded(session, source).await?;

    let receipt = controller.submit(session, form.into()).await?;
    let notification = receipt.notification();

    Ok(Json(BidAcceptedBody {
        receipt,
        notification: NotificationBody {
            message: notification.message,
            dismiss_after_ms: notification.dismiss_after.as_millis() as u64,
        },
        reset_form: true,
    }))
}

/// Rebuild the session from the source, like a page refresh
///
/// A failed reload keeps the previous session.
async fn reload(State(app): State<SharedApp>) -> Result<Response, ApiError> {
    let mut app = app.lock().await;
    let fresh = Session::load(&*app.source).await?;
    let session = app.session.insert(fresh);
    Ok(Json(LotsBody {
        lots: session.catalog.lots(),
    })
    .into_response())
}

pub fn router(app: SharedApp) -> Router {
    Router::new()
        .route("/lots", get(list_lots))
        .route("/lots/:lot", get(show_lot))
        .route("/bids", post(submit_bid))
        .route("/reload", post(reload))
        .with_state(app)
}

pub async fn run_http_server(
    addr: SocketAddr,
    app: SharedApp,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    info!(%addr, "serving");
    axum::Server::try_bind(&addr)
        .with_context(|| format!("Failed to bind {addr}"))?
        .serve(router(app).into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .context("Failed to run http server")?;

    Ok(())
}
