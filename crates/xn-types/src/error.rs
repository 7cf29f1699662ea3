/// Schema, value and codec error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Field name not declared by the struct schema.
    UnknownField { schema: String, field: String },
    /// Declared field with no value supplied.
    MissingField { schema: String, field: String },
    DuplicateField { schema: String, field: String },
    TypeMismatch { expected: String, found: String },
    /// Fixed-length collection built with the wrong number of elements.
    ArityMismatch { expected: usize, found: usize },
    UnexpectedEnd,
    TrailingBytes(usize),
    InvalidOptionTag(u8),
    IntegerOverflow { ty: &'static str, len: usize },
    InvalidUtf8,
    InvalidAddress(String),
    /// Multi-value types (`variadic`, `optional`) only exist at argument level.
    MultiValueNotNested(String),
    /// Unbounded list whose element type encodes to no bytes.
    ZeroSizedElement(String),
    /// An absent `optional<T>` argument followed by a present one.
    OptionalGap,
    UnknownType(String),
    InvalidAbi(String),
    EmptyBatch,
    InvalidName(&'static str),
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownField { schema, field } => {
                write!(f, "unknown field `{field}` for struct `{schema}`")
            }
            Self::MissingField { schema, field } => {
                write!(f, "missing field `{field}` for struct `{schema}`")
            }
            Self::DuplicateField { schema, field } => {
                write!(f, "duplicate field `{field}` for struct `{schema}`")
            }
            Self::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {expected}, found {found}")
            }
            Self::ArityMismatch { expected, found } => {
                write!(f, "collection length mismatch: expected {expected}, found {found}")
            }
            Self::UnexpectedEnd => write!(f, "unexpected end of input"),
            Self::TrailingBytes(n) => write!(f, "{n} trailing bytes after decode"),
            Self::InvalidOptionTag(tag) => write!(f, "invalid option tag {tag:#04x}"),
            Self::IntegerOverflow { ty, len } => {
                write!(f, "{len} bytes do not fit in {ty}")
            }
            Self::InvalidUtf8 => write!(f, "text field is not valid UTF-8"),
            Self::InvalidAddress(msg) => write!(f, "invalid address: {msg}"),
            Self::MultiValueNotNested(ty) => {
                write!(f, "{ty} can only be used as a top-level argument")
            }
            Self::ZeroSizedElement(ty) => {
                write!(f, "list element {ty} has no encoded size")
            }
            Self::OptionalGap => {
                write!(f, "absent optional argument followed by a present one")
            }
            Self::UnknownType(ty) => write!(f, "unknown type `{ty}`"),
            Self::InvalidAbi(msg) => write!(f, "invalid abi: {msg}"),
            Self::EmptyBatch => write!(f, "reservation batch is empty"),
            Self::InvalidName(msg) => write!(f, "invalid domain name: {msg}"),
        }
    }
}

impl std::error::Error for SchemaError {}
