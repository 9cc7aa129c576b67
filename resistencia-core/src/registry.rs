//! Rule registry - the name → function table consulted by agents
//!
//! Rule-description layers look functions up by their symbolic name
//! (`distancia`, `mov-valido`, `turno`, ...) and call them with dynamic
//! [`RuleValue`] arguments. The table is assembled once through
//! [`RuleRegistryBuilder`] and is immutable afterwards.

use std::fmt;
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::game_log;
use crate::rules;

// ============================================================================
// VALUES AND ERRORS
// ============================================================================

/// Dynamically typed argument or result of a rule function
#[derive(Clone, Debug, PartialEq)]
pub enum RuleValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl RuleValue {
    /// Numeric view (ints widen to reals)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RuleValue::Int(i) => Some(*i as f64),
            RuleValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Integral view; reals are accepted only when they carry no fraction
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RuleValue::Int(i) => Some(*i),
            RuleValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RuleValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RuleValue::Str(s) => Some(s),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            RuleValue::Int(_) => "integer",
            RuleValue::Float(_) => "float",
            RuleValue::Bool(_) => "boolean",
            RuleValue::Str(_) => "string",
        }
    }
}

impl fmt::Display for RuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleValue::Int(i) => write!(f, "{}", i),
            RuleValue::Float(x) => write!(f, "{}", x),
            RuleValue::Bool(b) => write!(f, "{}", b),
            RuleValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RuleValue {
    fn from(v: i64) -> Self {
        RuleValue::Int(v)
    }
}

impl From<i32> for RuleValue {
    fn from(v: i32) -> Self {
        RuleValue::Int(v as i64)
    }
}

impl From<f64> for RuleValue {
    fn from(v: f64) -> Self {
        RuleValue::Float(v)
    }
}

impl From<bool> for RuleValue {
    fn from(v: bool) -> Self {
        RuleValue::Bool(v)
    }
}

impl From<&str> for RuleValue {
    fn from(v: &str) -> Self {
        RuleValue::Str(v.to_string())
    }
}

impl From<String> for RuleValue {
    fn from(v: String) -> Self {
        RuleValue::Str(v)
    }
}

/// Errors at the registry boundary. Out-of-domain values are not errors;
/// only unknown names, wrong arity and wrong argument kinds are.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RuleError {
    #[error("Unknown rule function: {0}")]
    UnknownFunction(String),

    #[error("{name} expects {expected} arguments, got {got}")]
    Arity {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("{name}: argument {position} must be {expected}, got {got}")]
    ArgumentType {
        name: String,
        position: usize,
        expected: &'static str,
        got: &'static str,
    },

    #[error("{name}: host callback failed: {message}")]
    Host { name: String, message: String },
}

// ============================================================================
// FUNCTION ENTRIES
// ============================================================================

/// Checked view over the arguments of one call
pub struct Args<'a> {
    name: &'a str,
    values: &'a [RuleValue],
}

impl<'a> Args<'a> {
    fn type_error(&self, position: usize, expected: &'static str) -> RuleError {
        RuleError::ArgumentType {
            name: self.name.to_string(),
            position,
            expected,
            got: self.values[position].type_name(),
        }
    }

    pub fn value(&self, position: usize) -> &RuleValue {
        &self.values[position]
    }

    pub fn real(&self, position: usize) -> Result<f64, RuleError> {
        self.values[position]
            .as_f64()
            .ok_or_else(|| self.type_error(position, "a number"))
    }

    pub fn int(&self, position: usize) -> Result<i64, RuleError> {
        self.values[position]
            .as_i64()
            .ok_or_else(|| self.type_error(position, "an integer"))
    }

    /// Move code argument. Any number is accepted; non-integral numbers
    /// are not move codes and decode to the null move.
    pub fn move_code(&self, position: usize) -> Result<i64, RuleError> {
        self.real(position)?;
        Ok(self.values[position].as_i64().unwrap_or(0))
    }

    pub fn text(&self, position: usize) -> Result<&'a str, RuleError> {
        self.values[position]
            .as_str()
            .ok_or_else(|| self.type_error(position, "a string"))
    }

    /// Any value rendered as a log token
    pub fn token(&self, position: usize) -> String {
        self.values[position].to_string()
    }
}

/// Pure rule function
pub type PureFn = fn(&Args<'_>) -> Result<RuleValue, RuleError>;

/// Host callback with side effects (log appends)
pub type HostFn = fn(&Args<'_>) -> Result<(), RuleError>;

#[derive(Clone, Copy, Debug)]
pub enum RuleKind {
    Pure(PureFn),
    Host(HostFn),
}

/// One registered function
#[derive(Clone, Copy, Debug)]
pub struct RuleFunction {
    pub name: &'static str,
    pub params: &'static [&'static str],
    pub kind: RuleKind,
}

impl RuleFunction {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn is_pure(&self) -> bool {
        matches!(self.kind, RuleKind::Pure(_))
    }

    fn invoke(&self, values: &[RuleValue]) -> Result<RuleValue, RuleError> {
        if values.len() != self.arity() {
            return Err(RuleError::Arity {
                name: self.name.to_string(),
                expected: self.arity(),
                got: values.len(),
            });
        }

        let args = Args {
            name: self.name,
            values,
        };
        match self.kind {
            RuleKind::Pure(f) => f(&args),
            RuleKind::Host(f) => f(&args).map(|()| RuleValue::Bool(true)),
        }
    }
}

// ============================================================================
// STANDARD TABLE
// ============================================================================

fn distancia(args: &Args<'_>) -> Result<RuleValue, RuleError> {
    Ok(rules::distance(args.real(0)?, args.real(1)?, args.real(2)?, args.real(3)?).into())
}

fn dentro(args: &Args<'_>) -> Result<RuleValue, RuleError> {
    Ok(rules::within_bounds(
        args.real(0)?,
        args.real(1)?,
        args.real(2)?,
        args.real(3)?,
        args.real(4)?,
        args.real(5)?,
    )
    .into())
}

fn minimo(args: &Args<'_>) -> Result<RuleValue, RuleError> {
    // same tie rule as rules::minimum, but hand back the argument itself so ints stay ints
    if args.real(0)? < args.real(1)? {
        Ok(args.value(0).clone())
    } else {
        Ok(args.value(1).clone())
    }
}

fn mov_x(args: &Args<'_>) -> Result<RuleValue, RuleError> {
    Ok(rules::move_dx(args.move_code(0)?).into())
}

fn mov_y(args: &Args<'_>) -> Result<RuleValue, RuleError> {
    Ok(rules::move_dy(args.move_code(0)?).into())
}

fn mov_valido(args: &Args<'_>) -> Result<RuleValue, RuleError> {
    Ok(rules::move_valid(args.int(0)?, args.move_code(1)?, args.int(2)?, args.int(3)?).into())
}

fn valor(args: &Args<'_>) -> Result<RuleValue, RuleError> {
    let disclosed = if args.real(0)? == 0.0 { 0 } else { 1 };
    Ok(rules::piece_symbol(disclosed).into())
}

fn simetrico(args: &Args<'_>) -> Result<RuleValue, RuleError> {
    Ok(rules::symmetric_move(args.move_code(0)?).into())
}

fn sim(args: &Args<'_>) -> Result<RuleValue, RuleError> {
    match args.value(0) {
        RuleValue::Int(p) => Ok(rules::mirror_value(*p).into()),
        _ => Ok((rules::MAX_PIECE_VALUE as f64 - args.real(0)?).into()),
    }
}

fn turno(args: &Args<'_>) -> Result<RuleValue, RuleError> {
    Ok(rules::turn_owner(args.int(0)?, args.int(1)?).as_str().into())
}

fn a_fichero_tiempo(args: &Args<'_>) -> Result<(), RuleError> {
    let path = Path::new(args.text(0)?);
    game_log::file_new_turn(path, args.int(1)?).map_err(|e| RuleError::Host {
        name: "a-fichero-tiempo".to_string(),
        message: e.to_string(),
    })
}

fn a_fichero_jugador(args: &Args<'_>) -> Result<(), RuleError> {
    let path = Path::new(args.text(0)?);
    game_log::file_new_piece(
        path,
        &args.token(1),
        &args.token(2),
        &args.token(3),
        &args.token(4),
        &args.token(5),
        &args.token(6),
    )
    .map_err(|e| RuleError::Host {
        name: "a-fichero-jugador".to_string(),
        message: e.to_string(),
    })
}

/// The ten pure functions of the rule library
pub const STANDARD_FUNCTIONS: [RuleFunction; 10] = [
    RuleFunction { name: "distancia", params: &["x1", "y1", "x2", "y2"], kind: RuleKind::Pure(distancia) },
    RuleFunction { name: "dentro", params: &["x1", "y1", "x2", "y2", "x", "y"], kind: RuleKind::Pure(dentro) },
    RuleFunction { name: "minimo", params: &["n1", "n2"], kind: RuleKind::Pure(minimo) },
    RuleFunction { name: "mov-x", params: &["m"], kind: RuleKind::Pure(mov_x) },
    RuleFunction { name: "mov-y", params: &["m"], kind: RuleKind::Pure(mov_y) },
    RuleFunction { name: "mov-valido", params: &["dim", "m", "x", "y"], kind: RuleKind::Pure(mov_valido) },
    RuleFunction { name: "valor", params: &["descubierto"], kind: RuleKind::Pure(valor) },
    RuleFunction { name: "simetrico", params: &["m"], kind: RuleKind::Pure(simetrico) },
    RuleFunction { name: "sim", params: &["p"], kind: RuleKind::Pure(sim) },
    RuleFunction { name: "turno", params: &["ti", "ta"], kind: RuleKind::Pure(turno) },
];

/// Log-appending host callbacks
pub const HOST_CALLBACKS: [RuleFunction; 2] = [
    RuleFunction { name: "a-fichero-tiempo", params: &["filename", "turn"], kind: RuleKind::Host(a_fichero_tiempo) },
    RuleFunction {
        name: "a-fichero-jugador",
        params: &["filename", "team", "nid", "value", "x", "y", "covered"],
        kind: RuleKind::Host(a_fichero_jugador),
    },
];

// ============================================================================
// REGISTRY
// ============================================================================

/// Frozen name → function table
#[derive(Clone, Debug)]
pub struct RuleRegistry {
    functions: FxHashMap<&'static str, RuleFunction>,
    order: Vec<&'static str>,
}

impl RuleRegistry {
    pub fn builder() -> RuleRegistryBuilder {
        RuleRegistryBuilder::default()
    }

    /// All library functions plus both host callbacks
    pub fn standard() -> Self {
        Self::builder().standard().with_host_callbacks().build()
    }

    pub fn get(&self, name: &str) -> Option<&RuleFunction> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names in registration order
    pub fn names(&self) -> &[&'static str] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Look up and evaluate a function
    pub fn call(&self, name: &str, args: &[RuleValue]) -> Result<RuleValue, RuleError> {
        self.get(name)
            .ok_or_else(|| RuleError::UnknownFunction(name.to_string()))?
            .invoke(args)
    }

    pub fn call_bool(&self, name: &str, args: &[RuleValue]) -> Result<bool, RuleError> {
        let value = self.call(name, args)?;
        value.as_bool().ok_or_else(|| RuleError::ArgumentType {
            name: name.to_string(),
            position: 0,
            expected: "a boolean result",
            got: value.type_name(),
        })
    }

    pub fn call_f64(&self, name: &str, args: &[RuleValue]) -> Result<f64, RuleError> {
        let value = self.call(name, args)?;
        value.as_f64().ok_or_else(|| RuleError::ArgumentType {
            name: name.to_string(),
            position: 0,
            expected: "a numeric result",
            got: value.type_name(),
        })
    }

    pub fn call_i64(&self, name: &str, args: &[RuleValue]) -> Result<i64, RuleError> {
        let value = self.call(name, args)?;
        value.as_i64().ok_or_else(|| RuleError::ArgumentType {
            name: name.to_string(),
            position: 0,
            expected: "an integer result",
            got: value.type_name(),
        })
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Assembles a [`RuleRegistry`]; the only way to add entries
#[derive(Default)]
pub struct RuleRegistryBuilder {
    functions: FxHashMap<&'static str, RuleFunction>,
    order: Vec<&'static str>,
}

impl RuleRegistryBuilder {
    /// Add the ten rule library functions
    pub fn standard(mut self) -> Self {
        for function in STANDARD_FUNCTIONS {
            self.insert(function);
        }
        self
    }

    /// Add `a-fichero-tiempo` and `a-fichero-jugador`
    pub fn with_host_callbacks(mut self) -> Self {
        for function in HOST_CALLBACKS {
            self.insert(function);
        }
        self
    }

    /// Add (or replace) a pure function
    pub fn with_function(mut self, name: &'static str, params: &'static [&'static str], f: PureFn) -> Self {
        self.insert(RuleFunction {
            name,
            params,
            kind: RuleKind::Pure(f),
        });
        self
    }

    pub fn build(self) -> RuleRegistry {
        RuleRegistry {
            functions: self.functions,
            order: self.order,
        }
    }

    fn insert(&mut self, function: RuleFunction) {
        if self.functions.insert(function.name, function).is_none() {
            self.order.push(function.name);
        }
    }
}
