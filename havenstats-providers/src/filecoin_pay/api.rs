//! Filecoin Pay subgraph request and response types.

use havenstats_fetch::FetchError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::config::TokenConfig;
use crate::json::NumberOrString;

/// Fields read for every token.
const TOKEN_FIELDS: &str = "decimals totalSettledAmount totalOneTimePayment userFunds \
                            lockupCurrent lockupRate lockupLastSettledUntilEpoch";

/// Subgraph indexing status query.
pub(crate) const HEALTH_QUERY: &str = "{ _meta { block { number timestamp } hasIndexingErrors } }";

/// Upper bound on tokens per query (one alias letter each).
const MAX_TOKENS: usize = 26;

// ============================================================================
// GraphQL Envelope
// ============================================================================

/// A GraphQL request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQlRequest {
    /// Query document.
    pub query: String,
    /// Query variables.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub variables: Map<String, Value>,
}

impl GraphQlRequest {
    /// A request without variables.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Map::new(),
        }
    }
}

/// A GraphQL response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    /// Query result.
    pub data: Option<T>,
    /// Query errors.
    pub errors: Option<Vec<GraphQlErrorItem>>,
}

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlErrorItem {
    /// Error message.
    #[serde(default)]
    pub message: String,
}

impl<T> GraphQlResponse<T> {
    /// Returns the data, or the reported errors.
    ///
    /// A non-empty `errors` array wins even when `data` is present.
    pub fn into_data(self) -> Result<T, FetchError> {
        if let Some(errors) = self.errors.filter(|e| !e.is_empty()) {
            return Err(FetchError::GraphQl {
                messages: errors.into_iter().map(|e| e.message).collect(),
            });
        }
        self.data
            .ok_or_else(|| FetchError::Schema("GraphQL response has no data".to_string()))
    }
}

// ============================================================================
// Token Records
// ============================================================================

/// A `Token` entity as returned by the subgraph. `BigInt`s arrive as strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawToken {
    /// Token decimals.
    #[serde(default)]
    pub decimals: Option<NumberOrString>,
    /// Total settled through rails.
    #[serde(default)]
    pub total_settled_amount: Option<NumberOrString>,
    /// Total one-time payments.
    #[serde(default)]
    pub total_one_time_payment: Option<NumberOrString>,
    /// Deposited user funds.
    #[serde(default)]
    pub user_funds: Option<NumberOrString>,
    /// Currently locked amount.
    #[serde(default)]
    pub lockup_current: Option<NumberOrString>,
    /// Lockup rate per epoch.
    #[serde(default)]
    pub lockup_rate: Option<NumberOrString>,
    /// Epoch lockups are settled until.
    #[serde(default)]
    pub lockup_last_settled_until_epoch: Option<NumberOrString>,
}

/// Alias used for the token at `index` (`tokenA`, `tokenB`, ...).
pub(crate) fn token_alias(index: usize) -> String {
    format!("token{}", alias_letter(index))
}

fn alias_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|i| b'A'.checked_add(i))
        .map_or('Z', char::from)
}

/// Builds the `GetStatsDashboard` query for `tokens`.
pub(crate) fn stats_dashboard_request(tokens: &[TokenConfig]) -> Result<GraphQlRequest, FetchError> {
    if tokens.is_empty() {
        return Err(FetchError::Configuration(
            "filecoin_pay.tokens must not be empty".to_string(),
        ));
    }
    if tokens.len() > MAX_TOKENS {
        return Err(FetchError::Configuration(format!(
            "filecoin_pay.tokens supports at most {MAX_TOKENS} entries"
        )));
    }

    let mut params = Vec::with_capacity(tokens.len());
    let mut selections = Vec::with_capacity(tokens.len());
    let mut variables = Map::new();

    for (index, token) in tokens.iter().enumerate() {
        let letter = alias_letter(index);
        params.push(format!("$tokenAddress{letter}: Bytes!"));
        selections.push(format!(
            "token{letter}: token(id: $tokenAddress{letter}) {{ {TOKEN_FIELDS} }}"
        ));
        variables.insert(
            format!("tokenAddress{letter}"),
            Value::String(token.address.clone()),
        );
    }

    Ok(GraphQlRequest {
        query: format!(
            "query GetStatsDashboard({}) {{ {} }}",
            params.join(", "),
            selections.join(" ")
        ),
        variables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filecoin_pay::config::FilecoinPayConfig;

    #[test]
    fn test_default_query_shape() {
        let request = stats_dashboard_request(&FilecoinPayConfig::default().tokens).unwrap();

        assert!(request.query.starts_with(
            "query GetStatsDashboard($tokenAddressA: Bytes!, $tokenAddressB: Bytes!)"
        ));
        assert!(request.query.contains("tokenA: token(id: $tokenAddressA)"));
        assert!(request.query.contains("tokenB: token(id: $tokenAddressB)"));
        assert!(request.query.contains("lockupLastSettledUntilEpoch"));
        assert_eq!(
            request.variables["tokenAddressA"],
            "0x80B98d3aa09ffff255c3ba4A241111Ff1262F045"
        );
        assert_eq!(token_alias(1), "tokenB");
    }

    #[test]
    fn test_token_list_limits() {
        assert!(stats_dashboard_request(&[]).is_err());
        let many: Vec<TokenConfig> = (0..27)
            .map(|i| TokenConfig::new(format!("T{i}"), format!("0x{i:040x}")))
            .collect();
        assert!(stats_dashboard_request(&many).is_err());
        assert!(stats_dashboard_request(&many[..26]).is_ok());
    }

    #[test]
    fn test_errors_win_over_data() {
        let response: GraphQlResponse<Value> = serde_json::from_str(
            r#"{"data": {"tokenA": null}, "errors": [{"message": "indexer lagging"}]}"#,
        )
        .unwrap();
        assert_eq!(
            response.into_data().unwrap_err(),
            FetchError::GraphQl {
                messages: vec!["indexer lagging".to_string()]
            }
        );
    }

    #[test]
    fn test_missing_data_is_schema_error() {
        let response: GraphQlResponse<Value> = serde_json::from_str("{}").unwrap();
        assert!(matches!(response.into_data(), Err(FetchError::Schema(_))));

        let response: GraphQlResponse<Value> =
            serde_json::from_str(r#"{"data": {"x": 1}, "errors": []}"#).unwrap();
        assert!(response.into_data().is_ok());
    }

    fn decode<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, FetchError> {
        let response: GraphQlResponse<T> = serde_json::from_str(body)?;
        response.into_data()
    }

    #[test]
    fn test_envelope_decodes_types_without_default() {
        #[derive(Debug, Deserialize)]
        struct Block {
            number: u64,
        }

        let block: Block = decode(r#"{"data": {"number": 7}}"#).unwrap();
        assert_eq!(block.number, 7);
        assert!(matches!(decode::<Block>(r#"{"data": null}"#), Err(FetchError::Schema(_))));
    }
}
