//! Tool registration table
//!
//! Maps a tool name to its description, parameter schema and handler. The
//! table knows nothing about JSON-RPC; the server looks tools up here and
//! wraps the results.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use super::protocol::Tool;
use crate::error::{IndodaxError, IndodaxResult};
use crate::indodax::de::opt_u64_or_string;
use crate::indodax::requests::{
    CancelByClientOrderId, CancelOrder, CheckDownline, CreateVoucher, GetInfo,
    GetOrder, GetOrderByClientOrderId, ListDownline, OpenOrders, OrderHistory, Trade,
    TradeHistory, TransHistory, WithdrawCoin, WithdrawFee,
};
use crate::indodax::{IndodaxClient, PrivateRequest, PublicEndpoint};

pub type ToolFuture<'a> = Pin<Box<dyn Future<Output = IndodaxResult<Value>> + Send + 'a>>;

/// Handler invoked with the client and the raw `arguments` object
pub type ToolHandler = for<'a> fn(&'a IndodaxClient, Value) -> ToolFuture<'a>;

/// JSON Schema primitive type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Number,
}

impl ParamKind {
    pub fn json_type(self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
    pub allowed: &'static [&'static str],
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
            allowed: &[],
            default: None,
        }
    }

    pub fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }

    pub fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = allowed;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    fn schema(&self) -> Value {
        let mut prop = Map::new();
        prop.insert("type".into(), json!(self.kind.json_type()));
        prop.insert("description".into(), json!(self.description));
        if !self.allowed.is_empty() {
            prop.insert("enum".into(), json!(self.allowed));
        }
        if let Some(default) = &self.default {
            prop.insert("default".into(), default.clone());
        }
        Value::Object(prop)
    }
}

/// One registered tool
#[derive(Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    /// Exchange method name for private tools, accepted as an alias
    pub method: Option<&'static str>,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
    pub handler: ToolHandler,
}

impl fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSpec")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("params", &self.params.len())
            .finish()
    }
}

impl ToolSpec {
    /// Tool backed by a public endpoint
    pub fn public(
        name: &'static str,
        description: &'static str,
        params: Vec<ParamSpec>,
        handler: ToolHandler,
    ) -> Self {
        Self {
            name,
            method: None,
            description,
            params,
            handler,
        }
    }

    /// Tool backed by a private method; adds the optional `nonce` parameter
    pub fn private<R>(
        name: &'static str,
        description: &'static str,
        mut params: Vec<ParamSpec>,
    ) -> Self
    where
        R: PrivateRequest + DeserializeOwned + Send + 'static,
    {
        params.push(ParamSpec::optional(
            "nonce",
            ParamKind::Integer,
            "Explicit nonce; must increase per API key. Replaces the automatic timestamp.",
        ));
        Self {
            name,
            method: Some(R::METHOD),
            description,
            params,
            handler: private_tool::<R>,
        }
    }

    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn descriptor(&self) -> Tool {
        Tool {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: self.input_schema(),
        }
    }

    pub async fn invoke(&self, client: &IndodaxClient, args: Value) -> IndodaxResult<Value> {
        (self.handler)(client, args).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolSpec>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: ToolSpec) -> &mut Self {
        self.tools.push(tool);
        self
    }

    /// Look a tool up by name, or by exchange method name for private tools
    pub fn find(&self, name: &str) -> Option<&ToolSpec> {
        self.tools
            .iter()
            .find(|t| t.name == name)
            .or_else(|| self.tools.iter().find(|t| t.method == Some(name)))
    }

    pub fn tools(&self) -> &[ToolSpec] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn descriptors(&self) -> Vec<Tool> {
        self.tools.iter().map(ToolSpec::descriptor).collect()
    }

    /// Every public and private Indodax tool
    pub fn indodax() -> Self {
        use self::ParamKind::{Integer, Number, String as Text};

        let pair_id = || {
            ParamSpec::optional("pair_id", Text, "Pair id such as btc_idr; omit for the default pair")
        };
        let history = || {
            vec![
                ParamSpec::optional("pair", Text, "Pair filter, e.g. btc_idr"),
                ParamSpec::optional("count", Integer, "Maximum number of records")
                    .with_default(json!(100)),
                ParamSpec::optional("from_id", Integer, "Start from this id"),
                ParamSpec::optional("end_id", Integer, "End at this id"),
                ParamSpec::optional("order", Text, "Sort direction")
                    .one_of(&["asc", "desc"])
                    .with_default(json!("desc")),
            ]
        };

        let mut registry = Self::new();
        registry
            .register(ToolSpec::public(
                "server_time",
                "Get server time (public endpoint).",
                vec![],
                server_time,
            ))
            .register(ToolSpec::public(
                "pairs",
                "Get list of available trading pairs.",
                vec![],
                pairs,
            ))
            .register(ToolSpec::public(
                "price_increments",
                "Get price increments per pair.",
                vec![],
                price_increments,
            ))
            .register(ToolSpec::public(
                "summaries",
                "Get summaries for all pairs.",
                vec![],
                summaries,
            ))
            .register(ToolSpec::public(
                "ticker",
                "Get ticker for a pair, or the default ticker when no pair is given.",
                vec![pair_id()],
                ticker,
            ))
            .register(ToolSpec::public(
                "ticker_all",
                "Get ticker for all pairs.",
                vec![],
                ticker_all,
            ))
            .register(ToolSpec::public(
                "trades",
                "Get recent trades for a pair, or the default pair when no pair is given.",
                vec![pair_id()],
                trades,
            ))
            .register(ToolSpec::private::<GetInfo>(
                "get_info",
                "Get user balances, server time, addresses etc. Equivalent to `getInfo`.",
                vec![],
            ))
            .register(ToolSpec::private::<TransHistory>(
                "trans_history",
                "Fetch deposit and withdrawal history between two dates (YYYY-MM-DD). The server defaults to the last 7 days.",
                vec![
                    ParamSpec::optional("start", Text, "Start date, YYYY-MM-DD"),
                    ParamSpec::optional("end", Text, "End date, YYYY-MM-DD"),
                ],
            ))
            .register(ToolSpec::private::<Trade>(
                "trade",
                "Create a buy/sell order.",
                vec![
                    ParamSpec::required("pair", Text, "Trading pair, e.g. btc_idr"),
                    ParamSpec::required("type", Text, "Order side").one_of(&["buy", "sell"]),
                    ParamSpec::required("price", Number, "Price per unit"),
                    ParamSpec::optional("idr", Number, "Amount in IDR (buy orders)"),
                    ParamSpec::optional("crypto", Number, "Amount in crypto (sell orders)"),
                    ParamSpec::optional("order_type", Text, "Order type")
                        .one_of(&["limit", "market"]),
                    ParamSpec::optional("client_order_id", Text, "Caller-chosen order id"),
                ],
            ))
            .register(ToolSpec::private::<TradeHistory>(
                "trade_history",
                "Get historical trades.",
                history(),
            ))
            .register(ToolSpec::private::<OpenOrders>(
                "open_orders",
                "Get open orders. Optionally filter by pair.",
                vec![ParamSpec::optional("pair", Text, "Pair filter, e.g. btc_idr")],
            ))
            .register(ToolSpec::private::<OrderHistory>(
                "order_history",
                "Fetch order history.",
                history(),
            ))
            .register(ToolSpec::private::<GetOrder>(
                "get_order",
                "Get order by its numeric ID.",
                vec![ParamSpec::required("order_id", Integer, "Order id")],
            ))
            .register(ToolSpec::private::<GetOrderByClientOrderId>(
                "get_order_by_client_order_id",
                "Get order by client generated ID.",
                vec![ParamSpec::required("client_order_id", Text, "Client order id")],
            ))
            .register(ToolSpec::private::<CancelOrder>(
                "cancel_order",
                "Cancel order by numeric ID.",
                vec![ParamSpec::required("order_id", Integer, "Order id")],
            ))
            .register(ToolSpec::private::<CancelByClientOrderId>(
                "cancel_by_client_order_id",
                "Cancel order by client order ID.",
                vec![ParamSpec::required("client_order_id", Text, "Client order id")],
            ))
            .register(ToolSpec::private::<WithdrawFee>(
                "withdraw_fee",
                "Estimate withdrawal fee.",
                vec![
                    ParamSpec::required("currency", Text, "Coin, e.g. btc"),
                    ParamSpec::required("amount", Number, "Amount of coin"),
                    ParamSpec::required("address", Text, "Destination address"),
                    ParamSpec::optional("network", Text, "Network code, e.g. erc20"),
                ],
            ))
            .register(ToolSpec::private::<WithdrawCoin>(
                "withdraw_coin",
                "Perform a crypto withdrawal.",
                vec![
                    ParamSpec::required("currency", Text, "Coin, e.g. btc"),
                    ParamSpec::required("amount", Number, "Amount of coin"),
                    ParamSpec::required("address", Text, "Destination address"),
                    ParamSpec::optional("network", Text, "Network code, e.g. erc20"),
                    ParamSpec::optional("memo", Text, "Destination memo or tag"),
                ],
            ))
            .register(ToolSpec::private::<ListDownline>(
                "list_downline",
                "List referral downlines (Partner only).",
                vec![],
            ))
            .register(ToolSpec::private::<CheckDownline>(
                "check_downline",
                "Check whether a username is your downline.",
                vec![ParamSpec::required("username", Text, "Username to check")],
            ))
            .register(ToolSpec::private::<CreateVoucher>(
                "create_voucher",
                "Create a voucher (Partner only).",
                vec![
                    ParamSpec::required("amount", Number, "Voucher amount"),
                    ParamSpec::optional("description", Text, "Voucher description"),
                ],
            ));
        registry
    }
}

fn parse_args<T: DeserializeOwned>(args: &Value) -> IndodaxResult<T> {
    let args = match args {
        Value::Null => Value::Object(Map::new()),
        other => other.clone(),
    };
    serde_json::from_value(args).map_err(|e| IndodaxError::InvalidParams(e.to_string()))
}

#[derive(Debug, Default, Deserialize)]
struct NonceArg {
    #[serde(default, deserialize_with = "opt_u64_or_string")]
    nonce: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PairArg {
    #[serde(default)]
    pair_id: Option<String>,
}

fn private_tool<'a, R>(client: &'a IndodaxClient, args: Value) -> ToolFuture<'a>
where
    R: PrivateRequest + DeserializeOwned + Send + 'static,
{
    Box::pin(async move {
        let payload = {
            let request: R = parse_args(&args)?;
            let NonceArg { nonce } = parse_args(&args)?;
            request.to_payload().with_opt("nonce", nonce)
        };
        client.private_post(payload).await
    })
}

fn fixed_public(client: &IndodaxClient, endpoint: PublicEndpoint) -> ToolFuture<'_> {
    Box::pin(async move { client.public(&endpoint).await })
}

fn server_time(client: &IndodaxClient, _args: Value) -> ToolFuture<'_> {
    fixed_public(client, PublicEndpoint::ServerTime)
}

fn pairs(client: &IndodaxClient, _args: Value) -> ToolFuture<'_> {
    fixed_public(client, PublicEndpoint::Pairs)
}

fn price_increments(client: &IndodaxClient, _args: Value) -> ToolFuture<'_> {
    fixed_public(client, PublicEndpoint::PriceIncrements)
}

fn summaries(client: &IndodaxClient, _args: Value) -> ToolFuture<'_> {
    fixed_public(client, PublicEndpoint::Summaries)
}

fn ticker_all(client: &IndodaxClient, _args: Value) -> ToolFuture<'_> {
    fixed_public(client, PublicEndpoint::TickerAll)
}

fn ticker(client: &IndodaxClient, args: Value) -> ToolFuture<'_> {
    Box::pin(async move {
        let PairArg { pair_id } = parse_args(&args)?;
        client.public(&PublicEndpoint::ticker(pair_id.as_deref())).await
    })
}

fn trades(client: &IndodaxClient, args: Value) -> ToolFuture<'_> {
    Box::pin(async move {
        let PairArg { pair_id } = parse_args(&args)?;
        client.public(&PublicEndpoint::trades(pair_id.as_deref())).await
    })
}
