/// Return for Burrow operations that can succeed (OK) or fail (Err)
pub type Result<T> = std::result::Result<T, BurrowError>;

/// All the possible errors from Burrow operations
#[derive(Debug)]
pub enum BurrowError {
    Redis(redis::RedisError),
    Pool(deadpool_redis::PoolError),
    CreatePool(deadpool_redis::CreatePoolError),
    Serialization(serde_json::Error),
    ItemNotFound(String),  // item id
    InvalidItem(String),   // message with details what is invalid
    Configuration(String), // option that can't be honored
    InvalidArgument(String),
    OutOfRange(String),
    Runtime(String),
    /// The consume loop gave up after `count` failures in a row, `last` is
    /// the most recent one translated to its transport kind
    TooManyErrors {
        count: usize,
        last: Box<BurrowError>,
    },
}

impl BurrowError {
    /// Collapse driver-level failures into the small, stable set of transport
    /// kinds (`InvalidArgument`, `OutOfRange`, `Runtime`) so callers don't
    /// need to match on Redis or pool internals.
    ///
    /// Errors that are already Burrow-level pass through untouched.
    pub fn into_transport(self) -> BurrowError {
        use BurrowError::*;
        match self {
            Redis(err) => translate_redis(err),
            Pool(deadpool_redis::PoolError::Backend(err)) => translate_redis(err),
            Pool(deadpool_redis::PoolError::NoRuntimeSpecified) => {
                InvalidArgument("no async runtime specified for the connection pool".to_string())
            }
            Pool(err) => Runtime(err.to_string()),
            CreatePool(err) => InvalidArgument(err.to_string()),
            other => other,
        }
    }

    /// Is this one of the stable transport kinds?
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            BurrowError::InvalidArgument(_) | BurrowError::OutOfRange(_) | BurrowError::Runtime(_)
        )
    }

    /// The error that made the consume loop give up, if this is `TooManyErrors`
    pub fn last_error(&self) -> Option<&BurrowError> {
        match self {
            BurrowError::TooManyErrors { last, .. } => Some(last.as_ref()),
            _ => None,
        }
    }
}

fn translate_redis(err: redis::RedisError) -> BurrowError {
    match err.kind() {
        redis::ErrorKind::InvalidClientConfig => BurrowError::InvalidArgument(err.to_string()),
        redis::ErrorKind::TypeError => BurrowError::OutOfRange(err.to_string()),
        _ => BurrowError::Runtime(err.to_string()),
    }
}

impl From<redis::RedisError> for BurrowError {
    fn from(err: redis::RedisError) -> Self {
        BurrowError::Redis(err)
    }
}

impl From<deadpool_redis::PoolError> for BurrowError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        BurrowError::Pool(err)
    }
}

impl From<deadpool_redis::CreatePoolError> for BurrowError {
    fn from(err: deadpool_redis::CreatePoolError) -> Self {
        BurrowError::CreatePool(err)
    }
}

impl From<serde_json::Error> for BurrowError {
    fn from(err: serde_json::Error) -> Self {
        BurrowError::Serialization(err)
    }
}

impl std::fmt::Display for BurrowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use BurrowError::*;
        match self {
            Redis(err) => write!(f, "Redis error: {}", err),
            Pool(err) => write!(f, "Connection pool error: {}", err),
            CreatePool(err) => write!(f, "Could not create connection pool: {}", err),
            Serialization(err) => write!(f, "Serialization error: {}", err),
            ItemNotFound(item_id) => write!(f, "Item not found: {}", item_id),
            InvalidItem(msg) => write!(f, "Invalid item: {}", msg),
            Configuration(msg) => write!(f, "Configuration error: {}", msg),
            InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            OutOfRange(msg) => write!(f, "Out of range: {}", msg),
            Runtime(msg) => write!(f, "Runtime error: {}", msg),
            TooManyErrors { count, last } => {
                write!(f, "Too many consecutive errors: {}, last: {}", count, last)
            }
        }
    }
}

impl std::error::Error for BurrowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use BurrowError::*;
        match self {
            Redis(err) => Some(err),
            Pool(err) => Some(err),
            CreatePool(err) => Some(err),
            Serialization(err) => Some(err),
            ItemNotFound(_) => None,
            InvalidItem(_) => None,
            Configuration(_) => None,
            InvalidArgument(_) => None,
            OutOfRange(_) => None,
            Runtime(_) => None,
            TooManyErrors { last, .. } => Some(last.as_ref()),
        }
    }
}
