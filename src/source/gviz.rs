//! Google Sheets "gviz" query endpoint
//!
//! Each sheet is fetched as JSON wrapped in a JSONP callback:
//! `/*O_o*/\ngoogle.visualization.Query.setResponse({...});`
use super::*;
use anyhow::{bail, format_err, Context};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

pub const LOT_LISTINGS_SHEET: &str = "Lot Listings";
pub const BID_BOARD_SHEET: &str = "Bid Board";

const RESPONSE_PREFIX: &str = "setResponse(";

#[derive(Debug, Deserialize)]
struct Response {
    table: Table,
}

#[derive(Debug, Deserialize)]
struct Table {
    #[serde(default)]
    rows: Vec<Row>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Row {
    #[serde(default)]
    c: Vec<Option<Cell>>,
}

#[derive(Debug, Default, Deserialize)]
struct Cell {
    #[serde(default)]
    v: Option<Value>,
}

impl Row {
    fn value(&self, column: usize) -> Option<&Value> {
        self.c
            .get(column)
            .and_then(Option::as_ref)
            .and_then(|cell| cell.v.as_ref())
            .filter(|v| !v.is_null())
    }
}

/// Strip the JSONP wrapper and return the table rows
pub fn parse_response(text: &str) -> Result<Vec<Row>> {
    let start = text
        .find(RESPONSE_PREFIX)
        .ok_or_else(|| format_err!("missing gviz response wrapper"))?
        + RESPONSE_PREFIX.len();
    let end = text
        .rfind(')')
        .filter(|end| start <= *end)
        .ok_or_else(|| format_err!("unterminated gviz response wrapper"))?;

    let response: Response =
        serde_json::from_str(&text[start..end]).context("malformed gviz response")?;
    Ok(response.table.rows)
}

/// Lot ids may come back as numbers when the column holds only digits
fn lot_id(value: &Value) -> Option<LotId> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        }),
        _ => None,
    }
}

fn bid_amount(value: Option<&Value>) -> Result<Amount> {
    let Some(value) = value else {
        return Ok(0);
    };
    match value {
        Value::Number(n) => {
            if let Some(amount) = n.as_u64() {
                return Ok(amount);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && (0.0..=Amount::MAX as f64).contains(&f) => {
                    Ok(f as Amount)
                }
                _ => bail!("invalid bid amount: {n}"),
            }
        }
        Value::String(s) if s.trim().is_empty() => Ok(0),
        Value::String(s) => s
            .trim()
            .parse()
            .with_context(|| format!("invalid bid amount: {s:?}")),
        other => bail!("invalid bid amount: {other}"),
    }
}

/// Rows without a lot id are skipped
pub fn lots_from_rows(rows: &[Row]) -> Vec<Lot> {
    rows.iter()
        .filter_map(|row| {
            let id = row.value(0).and_then(lot_id)?;
            let image = row
                .value(1)
                .and_then(Value::as_str)
                .filter(|url| !url.is_empty())
                .map(str::to_owned);
            Some(Lot { id, image })
        })
        .collect()
}

pub fn bids_from_rows(rows: &[Row]) -> Result<BTreeMap<LotId, Amount>> {
    let mut bids = BTreeMap::new();
    for row in rows {
        let Some(lot) = row.value(0).and_then(lot_id) else {
            continue;
        };
        let amount = bid_amount(row.value(1)).with_context(|| format!("lot {lot}"))?;
        bids.insert(lot, amount);
    }
    Ok(bids)
}

/// Reads the catalog out of a public spreadsheet
#[derive(Clone, Debug)]
pub struct GvizCatalogSource {
    client: reqwest::Client,
    base_url: Url,
    spreadsheet_id: String,
    lots_sheet: String,
    bids_sheet: String,
}

impl GvizCatalogSource {
    pub fn new(
        client: reqwest::Client,
        base_url: Url,
        spreadsheet_id: impl Into<String>,
        lots_sheet: impl Into<String>,
        bids_sheet: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url,
            spreadsheet_id: spreadsheet_id.into(),
            lots_sheet: lots_sheet.into(),
            bids_sheet: bids_sheet.into(),
        }
    }

    pub fn sheet_url(&self, sheet: &str) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("spreadsheets/d/{}/gviz/tq", self.spreadsheet_id))?;
        url.query_pairs_mut()
            .append_pair("tqx", "out:json")
            .append_pair("sheet", sheet);
        Ok(url)
    }

    async fn fetch_rows(&self, sheet: &str) -> Result<Vec<Row>> {
        let url = self.sheet_url(sheet)?;
        debug!(%url, sheet, "fetching sheet");

        let text = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_response(&text).with_context(|| format!("sheet {sheet:?}"))
    }
}

#[async_trait]
impl CatalogSource for GvizCatalogSource {
    async fn load_lots(&self) -> Result<Vec<Lot>> {
        Ok(lots_from_rows(&self.fetch_rows(&self.lots_sheet).await?))
    }

    async fn load_bids(&self) -> Result<BTreeMap<LotId, Amount>> {
        bids_from_rows(&self.fetch_rows(&self.bids_sheet).await?)
    }
}
