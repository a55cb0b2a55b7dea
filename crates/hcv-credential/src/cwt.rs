//! # Compact binary token (CWT) claims decoding.
//!
//! Accepts three framings of the claims map:
//! - a bare CBOR map,
//! - a CWT-tagged map (tag 61, or any tag wrapping the map),
//! - a COSE_Sign1 structure (tag 18 or untagged 4-array) whose payload
//!   byte string holds the map. Only one COSE_Sign1 layer is accepted.
//!
//! The decoder is conservative:
//! - Rejects indefinite-length items.
//! - Rejects map keys that are neither integers nor text.
//! - Bounds nesting depth.
//! - Rejects trailing bytes.
//!
//! Values convert into the generic `serde_json::Value` tree: byte strings
//! become standard base64 text, tags are unwrapped, `undefined` becomes
//! `null`. Nothing here checks the COSE signature.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use minicbor::data::Type;
use minicbor::Decoder;
use serde_json::{Map, Number, Value};

/// Issuer (`iss`).
pub const CLAIM_ISS: i64 = 1;
/// Expiration time (`exp`), POSIX seconds.
pub const CLAIM_EXP: i64 = 4;
/// Issued at (`iat`), POSIX seconds.
pub const CLAIM_IAT: i64 = 6;
/// Health certificate container.
pub const CLAIM_HCERT: i64 = -260;

const MAX_DEPTH: usize = 32;

const INDEFINITE: &str = "indefinite-length items are not supported";

/// A top-level CWT claim key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClaimKey {
    Int(i64),
    Text(String),
}

impl std::fmt::Display for ClaimKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Decode a CWT claims map from any of the accepted framings.
pub(crate) fn decode_claims(bytes: &[u8]) -> Result<BTreeMap<ClaimKey, Value>, String> {
    decode_framed(bytes, true)
}

fn decode_framed(bytes: &[u8], allow_cose: bool) -> Result<BTreeMap<ClaimKey, Value>, String> {
    let mut dec = Decoder::new(bytes);
    skip_tags(&mut dec)?;

    let claims = match dec.datatype().map_err(|e| e.to_string())? {
        Type::Map => decode_claims_map(&mut dec)?,
        Type::Array if allow_cose => {
            let payload = cose_sign1_payload(&mut dec)?;
            let claims = decode_framed(payload, false)?;
            if dec.position() != bytes.len() {
                return Err("trailing bytes after COSE_Sign1".to_string());
            }
            return Ok(claims);
        }
        Type::Array => return Err("COSE_Sign1 payload must be a claims map".to_string()),
        Type::MapIndef | Type::ArrayIndef => return Err(INDEFINITE.to_string()),
        other => return Err(format!("expected claims map or COSE_Sign1, found {other:?}")),
    };

    if dec.position() != bytes.len() {
        return Err("trailing bytes after claims map".to_string());
    }
    Ok(claims)
}

fn skip_tags(dec: &mut Decoder<'_>) -> Result<(), String> {
    while dec.datatype().map_err(|e| e.to_string())? == Type::Tag {
        dec.tag().map_err(|e| format!("failed to read tag: {e}"))?;
    }
    Ok(())
}

/// Read `[protected, unprotected, payload, signature]` and return the payload.
fn cose_sign1_payload<'b>(dec: &mut Decoder<'b>) -> Result<&'b [u8], String> {
    let len = definite(dec.array().map_err(|e| format!("failed to read array: {e}"))?)?;
    if len != 4 {
        return Err(format!("COSE_Sign1 must have 4 elements, found {len}"));
    }
    dec.skip().map_err(|e| format!("bad protected header: {e}"))?;
    dec.skip().map_err(|e| format!("bad unprotected header: {e}"))?;
    let payload = dec
        .bytes()
        .map_err(|e| format!("COSE_Sign1 payload must be a byte string: {e}"))?;
    dec.skip().map_err(|e| format!("bad signature: {e}"))?;
    Ok(payload)
}

fn decode_claims_map(dec: &mut Decoder<'_>) -> Result<BTreeMap<ClaimKey, Value>, String> {
    let len = definite(dec.map().map_err(|e| format!("failed to read map: {e}"))?)?;

    let mut claims = BTreeMap::new();
    for _ in 0..len {
        let key = decode_key(dec)?;
        let value = decode_value(dec, 1)?;
        claims.insert(key, value);
    }
    Ok(claims)
}

fn decode_key(dec: &mut Decoder<'_>) -> Result<ClaimKey, String> {
    match dec.datatype().map_err(|e| e.to_string())? {
        Type::I8
        | Type::I16
        | Type::I32
        | Type::I64
        | Type::U8
        | Type::U16
        | Type::U32
        | Type::U64 => {
            let i = dec
                .i64()
                .map_err(|e| format!("failed to decode int claim key: {e}"))?;
            Ok(ClaimKey::Int(i))
        }
        Type::String => {
            let s = dec
                .str()
                .map_err(|e| format!("failed to decode text claim key: {e}"))?;
            Ok(ClaimKey::Text(s.to_string()))
        }
        other => Err(format!("unsupported claim key type: {other:?}")),
    }
}

fn decode_value(dec: &mut Decoder<'_>, depth: usize) -> Result<Value, String> {
    if depth > MAX_DEPTH {
        return Err(format!("nesting deeper than {MAX_DEPTH} levels"));
    }
    match dec.datatype().map_err(|e| e.to_string())? {
        Type::Null => {
            dec.null().map_err(|e| e.to_string())?;
            Ok(Value::Null)
        }
        Type::Undefined => {
            dec.undefined().map_err(|e| e.to_string())?;
            Ok(Value::Null)
        }
        Type::Bool => Ok(Value::Bool(dec.bool().map_err(|e| e.to_string())?)),
        Type::U64 => Ok(Value::from(dec.u64().map_err(|e| e.to_string())?)),
        Type::I8 | Type::I16 | Type::I32 | Type::I64 | Type::U8 | Type::U16 | Type::U32 => {
            Ok(Value::from(dec.i64().map_err(|e| e.to_string())?))
        }
        Type::F16 => float_value(f64::from(dec.f16().map_err(|e| e.to_string())?)),
        Type::F32 => float_value(f64::from(dec.f32().map_err(|e| e.to_string())?)),
        Type::F64 => float_value(dec.f64().map_err(|e| e.to_string())?),
        Type::String => Ok(Value::String(
            dec.str().map_err(|e| e.to_string())?.to_string(),
        )),
        Type::Bytes => Ok(Value::String(
            BASE64.encode(dec.bytes().map_err(|e| e.to_string())?),
        )),
        Type::Tag => {
            dec.tag().map_err(|e| e.to_string())?;
            decode_value(dec, depth + 1)
        }
        Type::ArrayIndef | Type::MapIndef | Type::BytesIndef | Type::StringIndef => {
            Err(INDEFINITE.to_string())
        }
        Type::Array => {
            let len = definite(dec.array().map_err(|e| format!("failed to read array: {e}"))?)?;
            let mut items = Vec::new();
            for _ in 0..len {
                items.push(decode_value(dec, depth + 1)?);
            }
            Ok(Value::Array(items))
        }
        Type::Map => {
            let len = definite(dec.map().map_err(|e| format!("failed to read map: {e}"))?)?;
            let mut map = Map::new();
            for _ in 0..len {
                let key = decode_key(dec)?.to_string();
                let value = decode_value(dec, depth + 1)?;
                map.insert(key, value);
            }
            Ok(Value::Object(map))
        }
        other => Err(format!("unsupported claim value type: {other:?}")),
    }
}

/// Lengths are `None` only for indefinite items, which the datatype
/// dispatch rejects before any length is read.
fn definite(len: Option<u64>) -> Result<u64, String> {
    len.ok_or_else(|| INDEFINITE.to_string())
}

fn float_value(f: f64) -> Result<Value, String> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| format!("non-finite float {f} is not representable"))
}
