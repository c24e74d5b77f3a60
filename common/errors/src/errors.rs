#![no_std]

pub static ERROR_DIVISION_BY_ZERO: &[u8] = b"Division by zero.";

pub static ERROR_NEGATIVE_ELAPSED_TIME: &[u8] =
    b"Current timestamp is earlier than the last update timestamp.";

pub static ERROR_MALFORMED_NUMBER: &[u8] = b"Malformed unsigned decimal number.";

pub static ERROR_EMPTY_NUMBER: &[u8] = b"Empty numeric value.";

pub static ERROR_UNSUPPORTED_DECIMALS: &[u8] =
    b"Decimals exceed the supported precision of 27.";

pub static ERROR_USER_INDEX_AHEAD_OF_RESERVE: &[u8] =
    b"User incentives index is ahead of the reserve index.";

pub static ERROR_NEGATIVE_VALUE: &[u8] = b"Subtraction would produce a negative value.";

pub static ERROR_RESERVE_MISMATCH: &[u8] =
    b"Incentive data does not belong to the user reserve asset.";

pub static ERROR_UNKNOWN_RESERVE: &[u8] = b"User data references an unknown reserve asset.";
