//! JSON-RPC implementation of the ledger gateway port.
//!
//! Talks to a contract node over its standard JSON-RPC endpoint:
//! `eth_call` for reads, `eth_sendTransaction` for mutations (the node
//! holds the unlocked development accounts and signs on behalf of the
//! caller), and `eth_getTransactionReceipt` polling until a mutation is
//! mined.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::LedgerConfig;
use crate::domain::crop::{Crop, TransferRecord, TxReceipt};
use crate::domain::foundation::{ContentHash, Timestamp, UserAddress};
use crate::ports::{
    BuyCropRequest, LedgerError, LedgerGateway, RegisterCropRequest, TransferCropRequest,
};

use super::abi::{self, AbiError, Return, Token, TupleReader};

const REGISTER_CROP: &str =
    "registerCrop(string,uint256,uint256,string,uint256,uint256,string,string,string)";
const TRANSFER_CROP: &str = "transferCrop(uint256,address,string,string)";
const BUY_CROP: &str = "buyCrop(uint256)";
const GET_CROP: &str = "getCrop(uint256)";
const GET_ALL_CROPS: &str = "getAllCrops()";
const GET_AVAILABLE_CROPS: &str = "getAvailableCrops()";
const GET_CROPS_BY_OWNER: &str = "getCropsByOwner(address)";
const GET_CROP_HISTORY: &str = "getCropHistory(uint256)";

impl From<AbiError> for LedgerError {
    fn from(error: AbiError) -> Self {
        match error {
            AbiError::InvalidAddress { value } => LedgerError::InvalidAddress { value },
            other => LedgerError::decode(other.to_string()),
        }
    }
}

/// JSON-RPC request structure.
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, T: Serialize> {
    jsonrpc: &'static str,
    method: &'a str,
    params: T,
    id: u64,
}

/// JSON-RPC response structure.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: Option<String>,
    #[allow(dead_code)]
    id: Option<u64>,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// `eth_call` parameter object.
#[derive(Debug, Serialize)]
struct CallRequest<'a> {
    to: &'a str,
    data: &'a str,
}

/// `eth_sendTransaction` parameter object.
#[derive(Debug, Serialize)]
struct TransactionRequest<'a> {
    from: &'a str,
    to: &'a str,
    data: &'a str,
    /// Attached wei, hex-encoded. Omitted for non-payable calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptResponse {
    transaction_hash: String,
    block_number: String,
    gas_used: String,
    status: String,
}

impl ReceiptResponse {
    fn into_domain(self) -> Result<TxReceipt, LedgerError> {
        if parse_hex_u64(&self.status)? != 1 {
            return Err(LedgerError::reverted(self.transaction_hash));
        }
        Ok(TxReceipt {
            block_number: parse_hex_u64(&self.block_number)?,
            gas_used: parse_hex_u64(&self.gas_used)?,
            transaction_hash: self.transaction_hash,
            succeeded: true,
        })
    }
}

/// Ledger gateway backed by a contract node's JSON-RPC endpoint.
pub struct JsonRpcLedger {
    http_client: reqwest::Client,
    rpc_url: String,
    contract_address: String,
    receipt_poll_interval: Duration,
    receipt_poll_attempts: u32,
    request_id: AtomicU64,
}

impl JsonRpcLedger {
    /// Create a gateway from the ledger configuration.
    pub fn new(config: &LedgerConfig) -> Self {
        // Use default client if builder fails - reqwest::Client::new() is infallible
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http_client,
            rpc_url: config.rpc_url.clone(),
            contract_address: config.contract_address.clone(),
            receipt_poll_interval: Duration::from_millis(config.receipt_poll_interval_ms),
            receipt_poll_attempts: config.receipt_poll_attempts,
            request_id: AtomicU64::new(1),
        }
    }

    /// Make a JSON-RPC call, returning the raw result value.
    ///
    /// A missing result (some methods legitimately return null) comes
    /// back as [`serde_json::Value::Null`].
    async fn call_raw<P: Serialize>(
        &self,
        method: &str,
        params: P,
    ) -> Result<serde_json::Value, LedgerError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    LedgerError::Timeout
                } else {
                    LedgerError::unreachable(error.to_string())
                }
            })?;

        let rpc_response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|error| LedgerError::decode(error.to_string()))?;

        if let Some(error) = rpc_response.error {
            return Err(LedgerError::rpc(format!(
                "code {}: {}",
                error.code, error.message
            )));
        }

        Ok(rpc_response.result.unwrap_or(serde_json::Value::Null))
    }

    /// Make a JSON-RPC call and deserialize the result.
    async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, LedgerError> {
        let value = self.call_raw(method, params).await?;
        serde_json::from_value(value).map_err(|error| LedgerError::decode(error.to_string()))
    }

    /// Run a read-only contract call and parse its return data.
    async fn read_contract(&self, call_data: String) -> Result<Return, LedgerError> {
        let call = CallRequest {
            to: &self.contract_address,
            data: &call_data,
        };
        let raw: String = self.call("eth_call", (call, "latest")).await?;
        Ok(Return::from_hex(&raw)?)
    }

    /// Submit a state-changing contract call and wait for its receipt.
    async fn write_contract(
        &self,
        from: &UserAddress,
        call_data: String,
        value_wei: Option<u64>,
    ) -> Result<TxReceipt, LedgerError> {
        let from = from.as_str();
        if !abi::is_address(from) {
            return Err(LedgerError::invalid_address(from));
        }

        let transaction = TransactionRequest {
            from,
            to: &self.contract_address,
            data: &call_data,
            value: value_wei.map(|wei| format!("0x{wei:x}")),
        };
        let tx_hash: String = self.call("eth_sendTransaction", (transaction,)).await?;
        tracing::debug!(tx_hash, "transaction submitted, awaiting receipt");
        self.wait_for_receipt(&tx_hash).await
    }

    /// Poll for a transaction receipt until it appears or the polling
    /// window runs out.
    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<TxReceipt, LedgerError> {
        for _ in 0..self.receipt_poll_attempts {
            let value = self
                .call_raw("eth_getTransactionReceipt", (tx_hash,))
                .await?;
            if !value.is_null() {
                let receipt: ReceiptResponse = serde_json::from_value(value)
                    .map_err(|error| LedgerError::decode(error.to_string()))?;
                return receipt.into_domain();
            }
            tokio::time::sleep(self.receipt_poll_interval).await;
        }
        Err(LedgerError::receipt_timeout(tx_hash))
    }

    /// Run a read call whose return data is an array of crop tuples.
    async fn read_crop_list(&self, call_data: String) -> Result<Vec<Crop>, LedgerError> {
        let data = self.read_contract(call_data).await?;
        if data.is_empty() {
            return Ok(Vec::new());
        }
        data.root_array_of_tuples()?
            .iter()
            .map(decode_crop)
            .collect()
    }
}

#[async_trait]
impl LedgerGateway for JsonRpcLedger {
    async fn block_number(&self) -> Result<u64, LedgerError> {
        let raw: String = self.call("eth_blockNumber", Vec::<()>::new()).await?;
        parse_hex_u64(&raw)
    }

    async fn register_crop(&self, request: RegisterCropRequest) -> Result<TxReceipt, LedgerError> {
        let call_data = abi::encode_call(
            REGISTER_CROP,
            &[
                Token::Str(request.name),
                Token::Uint(request.quantity),
                Token::Uint(request.price),
                Token::Str(request.batch_number),
                Token::Uint(request.harvest_date.as_unix_secs()),
                Token::Uint(request.expiry_date.as_unix_secs()),
                Token::Str(hash_or_empty(request.image_hash)),
                Token::Str(hash_or_empty(request.certificate_hash)),
                Token::Str(request.farm_location),
            ],
        )?;
        self.write_contract(&request.farmer, call_data, None).await
    }

    async fn transfer_crop(&self, request: TransferCropRequest) -> Result<TxReceipt, LedgerError> {
        let call_data = abi::encode_call(
            TRANSFER_CROP,
            &[
                Token::Uint(request.crop_id),
                Token::Address(request.to.as_str().to_string()),
                Token::Str(request.note),
                Token::Str(hash_or_empty(request.data_hash)),
            ],
        )?;
        self.write_contract(&request.from, call_data, None).await
    }

    async fn buy_crop(&self, request: BuyCropRequest) -> Result<TxReceipt, LedgerError> {
        let call_data = abi::encode_call(BUY_CROP, &[Token::Uint(request.crop_id)])?;
        self.write_contract(&request.buyer, call_data, Some(request.amount))
            .await
    }

    async fn crop(&self, crop_id: u64) -> Result<Crop, LedgerError> {
        let call_data = abi::encode_call(GET_CROP, &[Token::Uint(crop_id)])?;
        let data = match self.read_contract(call_data).await {
            Ok(data) => data,
            Err(LedgerError::Rpc { message }) if is_revert(&message) => {
                return Err(LedgerError::crop_not_found(crop_id));
            }
            Err(other) => return Err(other),
        };
        if data.is_empty() {
            return Err(LedgerError::crop_not_found(crop_id));
        }
        decode_crop(&data.root_tuple()?)
    }

    async fn all_crops(&self) -> Result<Vec<Crop>, LedgerError> {
        let call_data = abi::encode_call(GET_ALL_CROPS, &[])?;
        self.read_crop_list(call_data).await
    }

    async fn available_crops(&self) -> Result<Vec<Crop>, LedgerError> {
        let call_data = abi::encode_call(GET_AVAILABLE_CROPS, &[])?;
        self.read_crop_list(call_data).await
    }

    async fn crops_by_owner(&self, owner: &UserAddress) -> Result<Vec<Crop>, LedgerError> {
        let call_data = abi::encode_call(
            GET_CROPS_BY_OWNER,
            &[Token::Address(owner.as_str().to_string())],
        )?;
        self.read_crop_list(call_data).await
    }

    async fn crop_history(&self, crop_id: u64) -> Result<Vec<TransferRecord>, LedgerError> {
        let call_data = abi::encode_call(GET_CROP_HISTORY, &[Token::Uint(crop_id)])?;
        let data = match self.read_contract(call_data).await {
            Ok(data) => data,
            Err(LedgerError::Rpc { message }) if is_revert(&message) => {
                return Err(LedgerError::crop_not_found(crop_id));
            }
            Err(other) => return Err(other),
        };
        if data.is_empty() {
            return Ok(Vec::new());
        }
        data.root_array_of_tuples()?
            .iter()
            .map(decode_transfer)
            .collect()
    }
}

/// Decode one crop tuple in contract storage order.
fn decode_crop(tuple: &TupleReader<'_>) -> Result<Crop, LedgerError> {
    Ok(Crop {
        id: tuple.uint(0)?,
        name: tuple.string(1)?,
        quantity: tuple.uint(2)?,
        price: tuple.uint(3)?,
        batch_number: tuple.string(4)?,
        harvest_date: decode_timestamp(tuple.uint(5)?)?,
        expiry_date: decode_timestamp(tuple.uint(6)?)?,
        image_hash: optional_hash(tuple.string(7)?),
        certificate_hash: optional_hash(tuple.string(8)?),
        farm_location: tuple.string(9)?,
        current_owner: decode_address(tuple.address(10)?)?,
        available: tuple.boolean(11)?,
        created_at: decode_timestamp(tuple.uint(12)?)?,
    })
}

/// Decode one ownership history entry.
fn decode_transfer(tuple: &TupleReader<'_>) -> Result<TransferRecord, LedgerError> {
    Ok(TransferRecord {
        from: decode_address(tuple.address(0)?)?,
        to: decode_address(tuple.address(1)?)?,
        timestamp: decode_timestamp(tuple.uint(2)?)?,
        note: tuple.string(3)?,
        data_hash: optional_hash(tuple.string(4)?),
    })
}

fn decode_address(value: String) -> Result<UserAddress, LedgerError> {
    UserAddress::new(value).map_err(|error| LedgerError::decode(error.to_string()))
}

fn decode_timestamp(secs: u64) -> Result<Timestamp, LedgerError> {
    Timestamp::from_unix_secs(secs).map_err(|error| LedgerError::decode(error.to_string()))
}

/// The contract stores absent file references as empty strings.
fn optional_hash(value: String) -> Option<ContentHash> {
    ContentHash::new(value).ok()
}

fn hash_or_empty(hash: Option<ContentHash>) -> String {
    hash.map(|h| h.as_str().to_string()).unwrap_or_default()
}

/// Development nodes surface require failures as RPC errors whose
/// message carries the revert marker.
fn is_revert(message: &str) -> bool {
    message.contains("revert")
}

/// Parse a hex quantity string like `0x4b7`.
fn parse_hex_u64(raw: &str) -> Result<u64, LedgerError> {
    let stripped = raw.trim_start_matches("0x");
    u64::from_str_radix(stripped, 16)
        .map_err(|_| LedgerError::decode(format!("not a hex quantity: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FARMER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
    const BUYER: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

    enum Field {
        Uint(u64),
        Addr(&'static str),
        Bool(bool),
        Str(&'static str),
    }

    fn word(value: u64) -> String {
        format!("{value:064x}")
    }

    fn address_word(addr: &str) -> String {
        format!("{:0>64}", &addr[2..])
    }

    fn string_words(value: &str) -> String {
        let content = hex::encode(value);
        let padded = (value.len() + 31) / 32 * 32;
        format!(
            "{}{}{}",
            word(value.len() as u64),
            content,
            "0".repeat(padded * 2 - content.len())
        )
    }

    fn tuple_hex(fields: &[Field]) -> String {
        let head_size = fields.len() * 32;
        let mut head = String::new();
        let mut tail = String::new();
        for field in fields {
            match field {
                Field::Uint(value) => head.push_str(&word(*value)),
                Field::Addr(addr) => head.push_str(&address_word(addr)),
                Field::Bool(value) => head.push_str(&word(u64::from(*value))),
                Field::Str(value) => {
                    head.push_str(&word((head_size + tail.len() / 2) as u64));
                    tail.push_str(&string_words(value));
                }
            }
        }
        format!("{head}{tail}")
    }

    fn array_hex(tuples: &[String]) -> String {
        let offsets_size = tuples.len() * 32;
        let mut offsets = String::new();
        let mut body = String::new();
        for tuple in tuples {
            offsets.push_str(&word((offsets_size + body.len() / 2) as u64));
            body.push_str(tuple);
        }
        format!(
            "{}{}{}{}",
            word(32),
            word(tuples.len() as u64),
            offsets,
            body
        )
    }

    fn crop_tuple(id: u64, name: &'static str, image_hash: &'static str) -> String {
        tuple_hex(&[
            Field::Uint(id),
            Field::Str(name),
            Field::Uint(500),
            Field::Uint(2_000_000_000),
            Field::Str("BATCH-7"),
            Field::Uint(1_705_276_800),
            Field::Uint(1_710_000_000),
            Field::Str(image_hash),
            Field::Str(""),
            Field::Str("Nashik, Maharashtra"),
            Field::Addr(FARMER),
            Field::Bool(true),
            Field::Uint(1_705_300_000),
        ])
    }

    #[test]
    fn decodes_a_crop_from_return_data() {
        let raw = format!("0x{}{}", word(32), crop_tuple(42, "Alphonso Mango", "QmImage"));
        let data = Return::from_hex(&raw).unwrap();
        let crop = decode_crop(&data.root_tuple().unwrap()).unwrap();

        assert_eq!(crop.id, 42);
        assert_eq!(crop.name, "Alphonso Mango");
        assert_eq!(crop.quantity, 500);
        assert_eq!(crop.price, 2_000_000_000);
        assert_eq!(crop.batch_number, "BATCH-7");
        assert_eq!(crop.harvest_date.as_unix_secs(), 1_705_276_800);
        assert_eq!(crop.image_hash.as_ref().map(|h| h.as_str()), Some("QmImage"));
        assert_eq!(crop.certificate_hash, None);
        assert_eq!(crop.farm_location, "Nashik, Maharashtra");
        assert_eq!(crop.current_owner.as_str(), FARMER);
        assert!(crop.available);
    }

    #[test]
    fn decodes_a_crop_list() {
        let raw = format!(
            "0x{}",
            array_hex(&[crop_tuple(1, "Rice", ""), crop_tuple(2, "Wheat", "QmW")])
        );
        let data = Return::from_hex(&raw).unwrap();
        let crops: Vec<Crop> = data
            .root_array_of_tuples()
            .unwrap()
            .iter()
            .map(decode_crop)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(crops.len(), 2);
        assert_eq!(crops[0].name, "Rice");
        assert_eq!(crops[0].image_hash, None);
        assert_eq!(crops[1].name, "Wheat");
        assert_eq!(crops[1].id, 2);
    }

    #[test]
    fn decodes_a_transfer_record() {
        let tuple = tuple_hex(&[
            Field::Addr(FARMER),
            Field::Addr(BUYER),
            Field::Uint(1_705_400_000),
            Field::Str("Handed to distributor"),
            Field::Str(""),
        ]);
        let raw = format!("0x{}{}", word(32), tuple);
        let data = Return::from_hex(&raw).unwrap();
        let record = decode_transfer(&data.root_tuple().unwrap()).unwrap();

        assert_eq!(record.from.as_str(), FARMER);
        assert_eq!(record.to.as_str(), BUYER);
        assert_eq!(record.timestamp.as_unix_secs(), 1_705_400_000);
        assert_eq!(record.note, "Handed to distributor");
        assert_eq!(record.data_hash, None);
    }

    #[test]
    fn successful_receipt_converts_to_domain() {
        let receipt = ReceiptResponse {
            transaction_hash: "0xabc".to_string(),
            block_number: "0x10".to_string(),
            gas_used: "0x5208".to_string(),
            status: "0x1".to_string(),
        };
        let domain = receipt.into_domain().unwrap();
        assert_eq!(domain.block_number, 16);
        assert_eq!(domain.gas_used, 21000);
        assert!(domain.succeeded);
    }

    #[test]
    fn failed_receipt_becomes_reverted_error() {
        let receipt = ReceiptResponse {
            transaction_hash: "0xdead".to_string(),
            block_number: "0x10".to_string(),
            gas_used: "0x5208".to_string(),
            status: "0x0".to_string(),
        };
        assert!(matches!(
            receipt.into_domain(),
            Err(LedgerError::TransactionReverted { tx_hash }) if tx_hash == "0xdead"
        ));
    }

    #[test]
    fn transaction_request_omits_value_when_absent() {
        let request = TransactionRequest {
            from: FARMER,
            to: BUYER,
            data: "0xabcd",
            value: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("value").is_none());
        assert_eq!(json["from"], FARMER);
    }

    #[test]
    fn transaction_request_renders_value_as_hex() {
        let request = TransactionRequest {
            from: BUYER,
            to: FARMER,
            data: "0xabcd",
            value: Some(format!("0x{:x}", 10_000_000_000u64)),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["value"], "0x2540be400");
    }

    #[test]
    fn call_params_serialize_as_positional_array() {
        let call = CallRequest {
            to: FARMER,
            data: "0x1234",
        };
        let json = serde_json::to_value(&(call, "latest")).unwrap();
        assert_eq!(json[0]["to"], FARMER);
        assert_eq!(json[1], "latest");
    }

    #[test]
    fn parses_hex_quantities() {
        assert_eq!(parse_hex_u64("0x0").unwrap(), 0);
        assert_eq!(parse_hex_u64("0x4b7").unwrap(), 1207);
        assert!(parse_hex_u64("4b7").is_ok());
        assert!(parse_hex_u64("0xzz").is_err());
    }

    #[test]
    fn revert_markers_are_detected() {
        assert!(is_revert("code 3: execution reverted: Crop does not exist"));
        assert!(is_revert("code -32000: VM Exception: revert"));
        assert!(!is_revert("code -32000: nonce too low"));
    }

    #[test]
    fn empty_hash_fields_decode_to_none() {
        assert_eq!(optional_hash(String::new()), None);
        assert_eq!(optional_hash("  ".to_string()), None);
        assert_eq!(
            optional_hash("QmHash".to_string()).map(|h| h.as_str().to_string()),
            Some("QmHash".to_string())
        );
    }
}
