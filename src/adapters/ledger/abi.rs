//! Call-data codec for the supply-chain contract.
//!
//! Covers exactly the types the contract surface uses: `uint256` capped
//! at the `u64` range, `address`, `bool`, `string`, and the dynamic
//! tuples and tuple arrays the read calls return. Call data is a 4-byte
//! selector (the leading bytes of the keccak-256 of the canonical
//! signature) followed by 32-byte head slots; dynamic values live in a
//! tail area addressed by byte offsets relative to the enclosing
//! structure.

use sha3::{Digest, Keccak256};
use thiserror::Error;

const WORD: usize = 32;

/// A value passed to a contract call.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `uint256`, restricted to the `u64` range the gateway works in.
    Uint(u64),
    /// `address`, as `0x` followed by 40 hex characters.
    Address(String),
    /// `bool`.
    Bool(bool),
    /// `string`, UTF-8, dynamically sized.
    Str(String),
}

/// Errors from encoding call data or decoding return data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AbiError {
    /// The return data ends before a value that should be present.
    #[error("Return data ends before the value at byte {offset}")]
    OutOfBounds { offset: usize },

    /// The return data is not valid hex.
    #[error("Return data is not valid hex")]
    InvalidHex,

    /// An address is not `0x` followed by 40 hex characters.
    #[error("Invalid contract address: {value}")]
    InvalidAddress { value: String },

    /// A numeric value does not fit in `u64`.
    #[error("Numeric value exceeds the supported range")]
    ValueTooLarge,

    /// A string field holds bytes that are not UTF-8.
    #[error("String field is not valid UTF-8")]
    InvalidUtf8,
}

/// Encode a contract call as `0x`-prefixed hex call data.
///
/// `signature` is the canonical function signature with no parameter
/// names or spaces, e.g. `transferCrop(uint256,address,string,string)`.
pub fn encode_call(signature: &str, params: &[Token]) -> Result<String, AbiError> {
    let selector = Keccak256::digest(signature.as_bytes());
    let head_size = params.len() * WORD;
    let mut head = Vec::with_capacity(head_size);
    let mut tail: Vec<u8> = Vec::new();

    for param in params {
        match param {
            Token::Uint(value) => head.extend_from_slice(&uint_word(*value)),
            Token::Address(value) => head.extend_from_slice(&address_word(value)?),
            Token::Bool(value) => head.extend_from_slice(&uint_word(u64::from(*value))),
            Token::Str(value) => {
                // Dynamic values get an offset slot in the head and
                // their content appended to the tail.
                head.extend_from_slice(&uint_word((head_size + tail.len()) as u64));
                append_string(&mut tail, value);
            }
        }
    }

    let mut out = String::with_capacity(2 + 8 + (head.len() + tail.len()) * 2);
    out.push_str("0x");
    out.push_str(&hex::encode(&selector[..4]));
    out.push_str(&hex::encode(&head));
    out.push_str(&hex::encode(&tail));
    Ok(out)
}

/// Whether `value` has the shape of a contract address.
pub fn is_address(value: &str) -> bool {
    match value.strip_prefix("0x") {
        Some(rest) => rest.len() == 40 && rest.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

fn uint_word(value: u64) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&value.to_be_bytes());
    word
}

fn address_word(value: &str) -> Result<[u8; WORD], AbiError> {
    if !is_address(value) {
        return Err(AbiError::InvalidAddress {
            value: value.to_string(),
        });
    }
    let bytes = hex::decode(&value[2..]).map_err(|_| AbiError::InvalidAddress {
        value: value.to_string(),
    })?;
    let mut word = [0u8; WORD];
    word[WORD - 20..].copy_from_slice(&bytes);
    Ok(word)
}

fn append_string(tail: &mut Vec<u8>, value: &str) {
    let bytes = value.as_bytes();
    tail.extend_from_slice(&uint_word(bytes.len() as u64));
    tail.extend_from_slice(bytes);
    let rem = bytes.len() % WORD;
    if rem != 0 {
        tail.extend(std::iter::repeat(0u8).take(WORD - rem));
    }
}

/// Return data from a contract call.
#[derive(Debug, Clone)]
pub struct Return {
    data: Vec<u8>,
}

impl Return {
    /// Parse `0x`-prefixed (or bare) hex return data.
    pub fn from_hex(raw: &str) -> Result<Self, AbiError> {
        let stripped = raw.strip_prefix("0x").unwrap_or(raw);
        let data = hex::decode(stripped).map_err(|_| AbiError::InvalidHex)?;
        Ok(Self { data })
    }

    /// True when the call returned no data at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read the return value as a single dynamic tuple.
    pub fn root_tuple(&self) -> Result<TupleReader<'_>, AbiError> {
        let base = read_uint(&self.data, 0)? as usize;
        if base > self.data.len() {
            return Err(AbiError::OutOfBounds { offset: base });
        }
        Ok(TupleReader {
            data: &self.data,
            base,
        })
    }

    /// Read the return value as a dynamic array of dynamic tuples.
    pub fn root_array_of_tuples(&self) -> Result<Vec<TupleReader<'_>>, AbiError> {
        let array_base = read_uint(&self.data, 0)? as usize;
        let len = read_uint(&self.data, array_base)? as usize;
        // Every element needs at least an offset slot, so a length
        // claiming more than the buffer holds is corrupt. Checked
        // before reserving capacity.
        if len > self.data.len() / WORD {
            return Err(AbiError::OutOfBounds { offset: array_base });
        }
        // Element offsets are relative to the first offset slot, one
        // word past the length.
        let elements_base = array_base + WORD;
        let mut readers = Vec::with_capacity(len);
        for index in 0..len {
            let rel = read_uint(&self.data, elements_base + index * WORD)? as usize;
            let base = elements_base
                .checked_add(rel)
                .filter(|&b| b <= self.data.len())
                .ok_or(AbiError::OutOfBounds { offset: rel })?;
            readers.push(TupleReader {
                data: &self.data,
                base,
            });
        }
        Ok(readers)
    }
}

/// Field accessor over one encoded tuple.
///
/// Field indexes are zero-based head-slot positions; dynamic fields are
/// resolved through their offset slot relative to the tuple base.
#[derive(Debug, Clone, Copy)]
pub struct TupleReader<'a> {
    data: &'a [u8],
    base: usize,
}

impl TupleReader<'_> {
    pub fn uint(&self, field: usize) -> Result<u64, AbiError> {
        read_uint(self.data, self.slot(field))
    }

    pub fn boolean(&self, field: usize) -> Result<bool, AbiError> {
        Ok(read_uint(self.data, self.slot(field))? != 0)
    }

    /// Address field, rendered as `0x` + 40 lowercase hex characters.
    pub fn address(&self, field: usize) -> Result<String, AbiError> {
        let word = read_word(self.data, self.slot(field))?;
        Ok(format!("0x{}", hex::encode(&word[WORD - 20..])))
    }

    pub fn string(&self, field: usize) -> Result<String, AbiError> {
        let rel = read_uint(self.data, self.slot(field))? as usize;
        let str_base = self
            .base
            .checked_add(rel)
            .ok_or(AbiError::OutOfBounds { offset: rel })?;
        let len = read_uint(self.data, str_base)? as usize;
        let start = str_base + WORD;
        let end = start
            .checked_add(len)
            .ok_or(AbiError::OutOfBounds { offset: start })?;
        let bytes = self
            .data
            .get(start..end)
            .ok_or(AbiError::OutOfBounds { offset: start })?;
        String::from_utf8(bytes.to_vec()).map_err(|_| AbiError::InvalidUtf8)
    }

    fn slot(&self, field: usize) -> usize {
        self.base + field * WORD
    }
}

fn read_word(data: &[u8], offset: usize) -> Result<&[u8], AbiError> {
    let end = offset
        .checked_add(WORD)
        .ok_or(AbiError::OutOfBounds { offset })?;
    data.get(offset..end)
        .ok_or(AbiError::OutOfBounds { offset })
}

fn read_uint(data: &[u8], offset: usize) -> Result<u64, AbiError> {
    let word = read_word(data, offset)?;
    if word[..WORD - 8].iter().any(|&b| b != 0) {
        return Err(AbiError::ValueTooLarge);
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&word[WORD - 8..]);
    Ok(u64::from_be_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    fn blob(parts: &[Vec<u8>]) -> Return {
        let data: Vec<u8> = parts.iter().flatten().copied().collect();
        Return::from_hex(&format!("0x{}", hex::encode(data))).unwrap()
    }

    fn string_words(value: &str) -> Vec<u8> {
        let mut out = Vec::new();
        append_string(&mut out, value);
        out
    }

    #[test]
    fn selector_matches_known_contract_functions() {
        // Reference selectors from the widely deployed token standard.
        let transfer = encode_call(
            "transfer(address,uint256)",
            &[Token::Address(OWNER.to_string()), Token::Uint(1)],
        )
        .unwrap();
        assert!(transfer.starts_with("0xa9059cbb"));

        let balance_of = encode_call(
            "balanceOf(address)",
            &[Token::Address(OWNER.to_string())],
        )
        .unwrap();
        assert!(balance_of.starts_with("0x70a08231"));
    }

    #[test]
    fn uint_encodes_right_aligned() {
        let encoded = encode_call("f(uint256)", &[Token::Uint(0x1234)]).unwrap();
        assert_eq!(encoded.len(), 2 + 8 + 64);
        assert!(encoded.ends_with(&format!("{:064x}", 0x1234)));
    }

    #[test]
    fn address_encodes_left_padded() {
        let encoded = encode_call("f(address)", &[Token::Address(OWNER.to_string())]).unwrap();
        let args = &encoded[2 + 8..];
        assert_eq!(&args[..24], "0".repeat(24));
        assert_eq!(&args[24..], &OWNER[2..]);
    }

    #[test]
    fn bool_encodes_as_zero_or_one() {
        let encoded = encode_call("f(bool)", &[Token::Bool(true)]).unwrap();
        assert!(encoded.ends_with(&format!("{:064x}", 1)));
        let encoded = encode_call("f(bool)", &[Token::Bool(false)]).unwrap();
        assert!(encoded.ends_with(&"0".repeat(64)));
    }

    #[test]
    fn string_gets_offset_length_and_padding() {
        let encoded = encode_call("f(string)", &[Token::Str("hello".to_string())]).unwrap();
        let args = &encoded[2 + 8..];
        // Offset slot points just past the single head slot.
        assert_eq!(&args[..64], format!("{:064x}", 32));
        assert_eq!(&args[64..128], format!("{:064x}", 5));
        assert_eq!(&args[128..138], hex::encode("hello"));
        assert_eq!(&args[138..192], "0".repeat(54));
    }

    #[test]
    fn multiple_dynamic_params_get_sequential_tail_offsets() {
        let encoded = encode_call(
            "f(uint256,string,string)",
            &[
                Token::Uint(7),
                Token::Str("ab".to_string()),
                Token::Str("cd".to_string()),
            ],
        )
        .unwrap();
        let args = &encoded[2 + 8..];
        // Three head slots, so the first string lands at byte 96 and the
        // second one 64 bytes later (length word plus one data word).
        assert_eq!(&args[64..128], format!("{:064x}", 96));
        assert_eq!(&args[128..192], format!("{:064x}", 160));
    }

    #[test]
    fn empty_string_is_just_a_length_word() {
        let encoded = encode_call("f(string)", &[Token::Str(String::new())]).unwrap();
        assert_eq!(encoded.len(), 2 + 8 + 64 + 64);
        assert!(encoded.ends_with(&"0".repeat(64)));
    }

    #[test]
    fn malformed_addresses_are_rejected() {
        for bad in ["f39fd6e51aad", "0x123", "0xzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz"] {
            let result = encode_call("f(address)", &[Token::Address(bad.to_string())]);
            assert!(matches!(result, Err(AbiError::InvalidAddress { .. })), "{bad}");
        }
    }

    #[test]
    fn is_address_checks_shape() {
        assert!(is_address(OWNER));
        assert!(!is_address("0x123"));
        assert!(!is_address("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"));
        assert!(!is_address("0xg39fd6e51aad88f6f4ce6ab8827279cfffb92266"));
    }

    #[test]
    fn decodes_a_dynamic_tuple() {
        // (uint256 id, string name, address owner, bool available) with
        // the string content after the four head slots.
        let data = blob(&[
            uint_word(32).to_vec(),
            uint_word(42).to_vec(),
            uint_word(128).to_vec(),
            address_word(OWNER).unwrap().to_vec(),
            uint_word(1).to_vec(),
            string_words("mango"),
        ]);

        let tuple = data.root_tuple().unwrap();
        assert_eq!(tuple.uint(0).unwrap(), 42);
        assert_eq!(tuple.string(1).unwrap(), "mango");
        assert_eq!(tuple.address(2).unwrap(), OWNER);
        assert!(tuple.boolean(3).unwrap());
    }

    #[test]
    fn decodes_an_array_of_tuples() {
        // Two (uint256, string) tuples. Element offsets are relative to
        // the first offset slot; each element spans 128 bytes.
        let data = blob(&[
            uint_word(32).to_vec(),
            uint_word(2).to_vec(),
            uint_word(64).to_vec(),
            uint_word(192).to_vec(),
            uint_word(1).to_vec(),
            uint_word(64).to_vec(),
            string_words("a"),
            uint_word(2).to_vec(),
            uint_word(64).to_vec(),
            string_words("b"),
        ]);

        let tuples = data.root_array_of_tuples().unwrap();
        assert_eq!(tuples.len(), 2);
        assert_eq!(tuples[0].uint(0).unwrap(), 1);
        assert_eq!(tuples[0].string(1).unwrap(), "a");
        assert_eq!(tuples[1].uint(0).unwrap(), 2);
        assert_eq!(tuples[1].string(1).unwrap(), "b");
    }

    #[test]
    fn empty_array_decodes_to_no_tuples() {
        let data = blob(&[uint_word(32).to_vec(), uint_word(0).to_vec()]);
        assert!(data.root_array_of_tuples().unwrap().is_empty());
    }

    #[test]
    fn array_length_exceeding_the_buffer_is_rejected() {
        // Length word claims 2^40 elements in a two-word buffer.
        let data = blob(&[uint_word(32).to_vec(), uint_word(1 << 40).to_vec()]);
        assert!(matches!(
            data.root_array_of_tuples(),
            Err(AbiError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn truncated_data_reports_out_of_bounds() {
        let data = blob(&[uint_word(32).to_vec(), uint_word(9).to_vec()]);
        let tuple = data.root_tuple().unwrap();
        assert_eq!(tuple.uint(0).unwrap(), 9);
        assert!(matches!(tuple.uint(1), Err(AbiError::OutOfBounds { .. })));
    }

    #[test]
    fn oversized_uint_is_rejected() {
        let mut word = [0u8; WORD];
        word[0] = 1;
        let data = blob(&[word.to_vec()]);
        assert!(matches!(
            read_uint_at_start(&data),
            Err(AbiError::ValueTooLarge)
        ));
    }

    fn read_uint_at_start(data: &Return) -> Result<u64, AbiError> {
        read_uint(&data.data, 0)
    }

    #[test]
    fn invalid_utf8_string_is_rejected() {
        let mut content = vec![0u8; WORD];
        content[0] = 0xff;
        content[1] = 0xfe;
        let data = blob(&[
            uint_word(32).to_vec(),
            uint_word(32).to_vec(),
            uint_word(2).to_vec(),
            content,
        ]);
        let tuple = data.root_tuple().unwrap();
        assert_eq!(tuple.string(0), Err(AbiError::InvalidUtf8));
    }

    #[test]
    fn non_hex_return_data_is_rejected() {
        assert_eq!(Return::from_hex("0xnothex").unwrap_err(), AbiError::InvalidHex);
    }

    #[test]
    fn empty_return_data_is_detectable() {
        assert!(Return::from_hex("0x").unwrap().is_empty());
    }
}
