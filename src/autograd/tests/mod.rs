//! Tests for autograd operations with gradient checking

mod test_utils;
