// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;

use std::time::{Duration, UNIX_EPOCH};

use crate::config::{Delimiter, TimestampMode};

fn config(color: bool, verbose: bool, delimiter: Delimiter) -> Config {
    Config {
        mode: TimestampMode::Relative,
        color,
        verbose,
        delimiter,
    }
}

fn at(micros: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_micros(micros)
}

#[test]
fn plain_prefix_is_timestamp_and_colon() {
    let config = config(false, false, Delimiter::Colon);
    let builder = PrefixBuilder::new(&config, at(0));
    assert_eq!(
        builder.build(ChannelKind::Stdout, at(123_456)),
        b"0.123456: ".to_vec()
    );
}

#[test]
fn verbose_colon_mode_tags_id_with_at_sign() {
    let config = config(false, true, Delimiter::Colon);
    let builder = PrefixBuilder::new(&config, at(0));
    assert_eq!(
        builder.build(ChannelKind::Stderr, at(123_456)),
        b"2@0.123456: ".to_vec()
    );
}

#[test]
fn verbose_space_mode_uses_spaces_throughout() {
    let config = config(false, true, Delimiter::Space);
    let builder = PrefixBuilder::new(&config, at(0));
    assert_eq!(
        builder.build(ChannelKind::Stderr, at(123_456)),
        b"2 0.123456 ".to_vec()
    );
}

#[test]
fn color_wraps_the_prefix_only() {
    let config = config(true, false, Delimiter::Colon);
    let builder = PrefixBuilder::new(&config, at(0));
    let prefix = String::from_utf8(builder.build(ChannelKind::Stderr, at(0))).unwrap();
    assert!(prefix.starts_with("\x1b[1;93m"));
    assert!(prefix.ends_with("\x1b[0m"));
    assert!(prefix.contains("0.000000: "));
}

#[test]
fn channels_get_their_own_colors() {
    let config = config(true, false, Delimiter::Colon);
    let builder = PrefixBuilder::new(&config, at(0));
    let out = builder.build(ChannelKind::Stdout, at(0));
    let err = builder.build(ChannelKind::Stderr, at(0));
    assert_ne!(out, err);
}
