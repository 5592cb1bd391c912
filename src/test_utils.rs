// Copyright 2026 The wlan-auth Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Assertion helpers shared across the crate's test modules.

/// Asserts that an expression matches a pattern, optionally running a
/// branch with the pattern's bindings. Panics with the unmatched value's
/// debug representation otherwise.
#[macro_export]
macro_rules! assert_variant {
    ($value:expr, $pattern:pat $(if $guard:expr)? => $branch:expr $(,)?) => {
        match $value {
            $pattern $(if $guard)? => $branch,
            other => panic!("unexpected variant: {:?}", other),
        }
    };
    ($value:expr, $pattern:pat $(if $guard:expr)? $(,)?) => {
        $crate::assert_variant!($value, $pattern $(if $guard)? => {})
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn matches_pattern_and_runs_branch() {
        let value: Option<u8> = Some(4);
        let doubled = assert_variant!(value, Some(x) => x * 2);
        assert_eq!(doubled, 8);
    }

    #[test]
    #[should_panic(expected = "unexpected variant")]
    fn panics_on_mismatch() {
        let value: Option<u8> = None;
        assert_variant!(value, Some(_));
    }
}
