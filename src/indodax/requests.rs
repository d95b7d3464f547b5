//! Request types for the private `tapi` methods
//!
//! Each type deserializes from tool arguments and writes itself into a
//! [`Payload`] using the exchange's parameter names. Optional fields are
//! only written when supplied.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::de::{
    f64_or_string, from_str_or_default, opt_f64_or_string, opt_from_str, opt_u64_or_string,
    u32_or_string, u64_or_string,
};
use super::payload::Payload;

/// A private API method with its parameters
pub trait PrivateRequest {
    /// Value of the `method` field
    const METHOD: &'static str;

    /// Append method-specific parameters
    fn write_params(&self, payload: Payload) -> Payload {
        payload
    }

    fn to_payload(&self) -> Payload {
        self.write_params(Payload::new(Self::METHOD))
    }
}

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

impl FromStr for OrderSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(OrderSide::Buy),
            "sell" => Ok(OrderSide::Sell),
            other => Err(format!("unknown order side `{}`, expected `buy` or `sell`", other)),
        }
    }
}

impl TryFrom<String> for OrderSide {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Order type accepted by `trade`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum OrderType {
    Limit,
    Market,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Limit => write!(f, "limit"),
            OrderType::Market => write!(f, "market"),
        }
    }
}

impl FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "limit" => Ok(OrderType::Limit),
            "market" => Ok(OrderType::Market),
            other => Err(format!("unknown order type `{}`, expected `limit` or `market`", other)),
        }
    }
}

impl TryFrom<String> for OrderType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Sort direction for history queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order `{}`, expected `asc` or `desc`", other)),
        }
    }
}

impl TryFrom<String> for SortOrder {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

fn default_count() -> u32 {
    100
}

/// `getInfo` - balances, server time, deposit addresses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetInfo {}

impl PrivateRequest for GetInfo {
    const METHOD: &'static str = "getInfo";
}

/// `transHistory` - deposits and withdrawals between two dates (YYYY-MM-DD)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransHistory {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl PrivateRequest for TransHistory {
    const METHOD: &'static str = "transHistory";

    fn write_params(&self, payload: Payload) -> Payload {
        payload
            .with_opt_text("start", self.start.as_deref())
            .with_opt_text("end", self.end.as_deref())
    }
}

/// `trade` - place a buy or sell order
///
/// Buy orders are usually sized with `idr`, sell orders with `crypto`.
#[derive(Debug, Clone, Deserialize)]
pub struct Trade {
    pub pair: String,
    #[serde(rename = "type")]
    pub side: OrderSide,
    #[serde(deserialize_with = "f64_or_string")]
    pub price: f64,
    #[serde(default, deserialize_with = "opt_f64_or_string")]
    pub idr: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_or_string")]
    pub crypto: Option<f64>,
    #[serde(default, deserialize_with = "opt_from_str")]
    pub order_type: Option<OrderType>,
    #[serde(default)]
    pub client_order_id: Option<String>,
}

impl Trade {
    pub fn buy(pair: impl Into<String>, price: f64, idr: f64) -> Self {
        Self {
            pair: pair.into(),
            side: OrderSide::Buy,
            price,
            idr: Some(idr),
            crypto: None,
            order_type: None,
            client_order_id: None,
        }
    }

    pub fn sell(pair: impl Into<String>, price: f64, crypto: f64) -> Self {
        Self {
            pair: pair.into(),
            side: OrderSide::Sell,
            price,
            idr: None,
            crypto: Some(crypto),
            order_type: None,
            client_order_id: None,
        }
    }

    pub fn with_client_order_id(mut self, id: impl Into<String>) -> Self {
        self.client_order_id = Some(id.into());
        self
    }
}

impl PrivateRequest for Trade {
    const METHOD: &'static str = "trade";

    fn write_params(&self, payload: Payload) -> Payload {
        payload
            .with("pair", self.pair.as_str())
            .with("type", self.side.to_string())
            .with("price", self.price)
            .with_opt("idr", self.idr)
            .with_opt("crypto", self.crypto)
            .with_opt("order_type", self.order_type.map(|t| t.to_string()))
            .with_opt_text("client_order_id", self.client_order_id.as_deref())
    }
}

/// Shared query shape of `tradeHistory` and `orderHistory`
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub pair: Option<String>,
    #[serde(default = "default_count", deserialize_with = "u32_or_string")]
    pub count: u32,
    #[serde(default, deserialize_with = "opt_u64_or_string")]
    pub from_id: Option<u64>,
    #[serde(default, deserialize_with = "opt_u64_or_string")]
    pub end_id: Option<u64>,
    #[serde(default, deserialize_with = "from_str_or_default")]
    pub order: SortOrder,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            pair: None,
            count: default_count(),
            from_id: None,
            end_id: None,
            order: SortOrder::default(),
        }
    }
}

impl HistoryQuery {
    fn write_params(&self, payload: Payload) -> Payload {
        payload
            .with("count", self.count)
            .with("order", self.order.to_string())
            .with_opt_text("pair", self.pair.as_deref())
            .with_opt("from", self.from_id)
            .with_opt("end", self.end_id)
    }
}

/// `tradeHistory` - executed trades
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradeHistory {
    #[serde(flatten)]
    pub query: HistoryQuery,
}

impl PrivateRequest for TradeHistory {
    const METHOD: &'static str = "tradeHistory";

    fn write_params(&self, payload: Payload) -> Payload {
        self.query.write_params(payload)
    }
}

/// `orderHistory` - past orders
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderHistory {
    #[serde(flatten)]
    pub query: HistoryQuery,
}

impl PrivateRequest for OrderHistory {
    const METHOD: &'static str = "orderHistory";

    fn write_params(&self, payload: Payload) -> Payload {
        self.query.write_params(payload)
    }
}

/// `openOrders` - optionally filtered by pair
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenOrders {
    #[serde(default)]
    pub pair: Option<String>,
}

impl PrivateRequest for OpenOrders {
    const METHOD: &'static str = "openOrders";

    fn write_params(&self, payload: Payload) -> Payload {
        payload.with_opt_text("pair", self.pair.as_deref())
    }
}

/// `getOrder`
#[derive(Debug, Clone, Deserialize)]
pub struct GetOrder {
    #[serde(deserialize_with = "u64_or_string")]
    pub order_id: u64,
}

impl PrivateRequest for GetOrder {
    const METHOD: &'static str = "getOrder";

    fn write_params(&self, payload: Payload) -> Payload {
        payload.with("order_id", self.order_id)
    }
}

/// `getOrderByClientOrderId`
#[derive(Debug, Clone, Deserialize)]
pub struct GetOrderByClientOrderId {
    pub client_order_id: String,
}

impl PrivateRequest for GetOrderByClientOrderId {
    const METHOD: &'static str = "getOrderByClientOrderId";

    fn write_params(&self, payload: Payload) -> Payload {
        payload.with("client_order_id", self.client_order_id.as_str())
    }
}

/// `cancelOrder`
#[derive(Debug, Clone, Deserialize)]
pub struct CancelOrder {
    #[serde(deserialize_with = "u64_or_string")]
    pub order_id: u64,
}

impl PrivateRequest for CancelOrder {
    const METHOD: &'static str = "cancelOrder";

    fn write_params(&self, payload: Payload) -> Payload {
        payload.with("order_id", self.order_id)
    }
}

/// `cancelByClientOrderId`
#[derive(Debug, Clone, Deserialize)]
pub struct CancelByClientOrderId {
    pub client_order_id: String,
}

impl PrivateRequest for CancelByClientOrderId {
    const METHOD: &'static str = "cancelByClientOrderId";

    fn write_params(&self, payload: Payload) -> Payload {
        payload.with("client_order_id", self.client_order_id.as_str())
    }
}

/// `withdrawFee` - fee estimate for a withdrawal
#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawFee {
    pub currency: String,
    #[serde(deserialize_with = "f64_or_string")]
    pub amount: f64,
    pub address: String,
    #[serde(default)]
    pub network: Option<String>,
}

impl PrivateRequest for WithdrawFee {
    const METHOD: &'static str = "withdrawFee";

    fn write_params(&self, payload: Payload) -> Payload {
        payload
            .with("currency", self.currency.as_str())
            .with("amount", self.amount)
            .with("address", self.address.as_str())
            .with_opt_text("network", self.network.as_deref())
    }
}

/// `withdrawCoin` - send coins to an external address
#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawCoin {
    pub currency: String,
    #[serde(deserialize_with = "f64_or_string")]
    pub amount: f64,
    pub address: String,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
}

impl PrivateRequest for WithdrawCoin {
    const METHOD: &'static str = "withdrawCoin";

    fn write_params(&self, payload: Payload) -> Payload {
        payload
            .with("currency", self.currency.as_str())
            .with("amount", self.amount)
            .with("address", self.address.as_str())
            .with_opt_text("network", self.network.as_deref())
            .with_opt_text("memo", self.memo.as_deref())
    }
}

/// `listDownline` - partner accounts only
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListDownline {}

impl PrivateRequest for ListDownline {
    const METHOD: &'static str = "listDownline";
}

/// `checkDownline`
#[derive(Debug, Clone, Deserialize)]
pub struct CheckDownline {
    pub username: String,
}

impl PrivateRequest for CheckDownline {
    const METHOD: &'static str = "checkDownline";

    fn write_params(&self, payload: Payload) -> Payload {
        payload.with("username", self.username.as_str())
    }
}

/// `createVoucher` - partner accounts only
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVoucher {
    #[serde(deserialize_with = "f64_or_string")]
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl PrivateRequest for CreateVoucher {
    const METHOD: &'static str = "createVoucher";

    fn write_params(&self, payload: Payload) -> Payload {
        payload
            .with("amount", self.amount)
            .with_opt_text("description", self.description.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode<R: PrivateRequest>(req: &R) -> String {
        req.to_payload().encode().unwrap()
    }

    #[test]
    fn test_get_info() {
        assert_eq!(encode(&GetInfo::default()), "method=getInfo");
    }

    #[test]
    fn test_trade_from_tool_arguments() {
        let req: Trade = serde_json::from_value(json!({
            "pair": "btc_idr",
            "type": "buy",
            "price": 650000000,
            "idr": 50000
        }))
        .unwrap();

        assert_eq!(req.side, OrderSide::Buy);
        assert_eq!(
            encode(&req),
            "method=trade&pair=btc_idr&type=buy&price=650000000&idr=50000"
        );
    }

    #[test]
    fn test_trade_rejects_unknown_side() {
        let result: Result<Trade, _> = serde_json::from_value(json!({
            "pair": "btc_idr",
            "type": "hold",
            "price": 1.0
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_trade_sell_with_client_order_id() {
        let req = Trade::sell("eth_idr", 55_000_000.0, 0.25).with_client_order_id("bot-1");
        assert_eq!(
            encode(&req),
            "method=trade&pair=eth_idr&type=sell&price=55000000&crypto=0.25&client_order_id=bot-1"
        );
    }

    #[test]
    fn test_history_defaults() {
        let req: TradeHistory = serde_json::from_value(json!({})).unwrap();
        assert_eq!(encode(&req), "method=tradeHistory&count=100&order=desc");
    }

    #[test]
    fn test_history_uses_exchange_field_names() {
        let req: OrderHistory = serde_json::from_value(json!({
            "pair": "btc_idr",
            "count": 10,
            "from_id": 5,
            "end_id": 9,
            "order": "asc"
        }))
        .unwrap();

        assert_eq!(
            encode(&req),
            "method=orderHistory&count=10&order=asc&pair=btc_idr&from=5&end=9"
        );
    }

    #[test]
    fn test_trans_history_skips_empty_dates() {
        let req = TransHistory {
            start: Some("2024-01-01".to_string()),
            end: Some(String::new()),
        };
        assert_eq!(encode(&req), "method=transHistory&start=2024-01-01");
    }

    #[test]
    fn test_order_lookups() {
        assert_eq!(encode(&GetOrder { order_id: 42 }), "method=getOrder&order_id=42");
        assert_eq!(
            encode(&CancelByClientOrderId {
                client_order_id: "abc".to_string()
            }),
            "method=cancelByClientOrderId&client_order_id=abc"
        );
    }

    #[test]
    fn test_withdraw_coin_optional_fields() {
        let req: WithdrawCoin = serde_json::from_value(json!({
            "currency": "xrp",
            "amount": 12.5,
            "address": "rAddress",
            "memo": "123"
        }))
        .unwrap();

        assert_eq!(
            encode(&req),
            "method=withdrawCoin&currency=xrp&amount=12.5&address=rAddress&memo=123"
        );
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let req: GetOrder = serde_json::from_value(json!({"order_id": "123"})).unwrap();
        assert_eq!(req.order_id, 123);

        let req: CancelOrder = serde_json::from_value(json!({"order_id": 123.0})).unwrap();
        assert_eq!(req.order_id, 123);

        let req: Trade = serde_json::from_value(json!({
            "pair": "btc_idr",
            "type": "buy",
            "price": "650000000",
            "idr": "50000"
        }))
        .unwrap();
        assert_eq!(
            encode(&req),
            "method=trade&pair=btc_idr&type=buy&price=650000000&idr=50000"
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let req: Trade = serde_json::from_value(json!({
            "pair": "btc_idr",
            "type": "SELL",
            "price": 1,
            "crypto": 0.5,
            "order_type": "Market"
        }))
        .unwrap();
        assert_eq!(req.side, OrderSide::Sell);
        assert_eq!(req.order_type, Some(OrderType::Market));

        let req: TradeHistory = serde_json::from_value(json!({"order": "ASC", "count": "5"})).unwrap();
        assert_eq!(encode(&req), "method=tradeHistory&count=5&order=asc");
    }

    #[test]
    fn test_blank_optional_keywords_are_absent() {
        let req: OrderHistory = serde_json::from_value(json!({
            "order": "",
            "from_id": "",
            "end_id": null
        }))
        .unwrap();
        assert_eq!(encode(&req), "method=orderHistory&count=100&order=desc");

        let req: Trade = serde_json::from_value(json!({
            "pair": "btc_idr",
            "type": "buy",
            "price": 1,
            "order_type": ""
        }))
        .unwrap();
        assert!(req.order_type.is_none());
    }

    #[test]
    fn test_non_numeric_amount_is_an_error() {
        let result: Result<WithdrawFee, _> = serde_json::from_value(json!({
            "currency": "btc",
            "amount": "lots",
            "address": "addr"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_required_field_is_an_error() {
        let result: Result<GetOrder, _> = serde_json::from_value(json!({}));
        assert!(result.is_err());
    }
}
