// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `for ... of` loops through the whole pass.

mod common;

use common::patch;
use decaf_ast::build::ForOfParts;
use pretty_assertions::assert_eq;

#[test]
fn own_keys_skip_inherited_properties() {
    let out = patch("for own k, v of obj\n  f k, v\n", |b| {
        let call = b.call(b.ident("f", 0), vec![b.ident("k", 1), b.ident("v", 1)]);
        vec![b.for_of(
            0,
            ForOfParts {
                key: b.ident("k", 0),
                value: Some(b.ident("v", 0)),
                target: b.ident("obj", 0),
                filter: None,
                body: b.block(vec![call]),
                own: true,
            },
        )]
    });
    assert_eq!(
        out,
        "for (k in obj) {\n  if (!Object.prototype.hasOwnProperty.call(obj, k)) { continue; }\n  v = obj[k];\n  f(k, v);\n}\n"
    );
}

#[test]
fn member_key_is_assigned_from_a_fresh_binding() {
    let out = patch("for @k of obj\n  f @k\n", |b| {
        let call = b.call(b.ident("f", 0), vec![b.this_member("k", 1)]);
        vec![b.for_of(
            0,
            ForOfParts {
                key: b.this_member("k", 0),
                value: None,
                target: b.ident("obj", 0),
                filter: None,
                body: b.block(vec![call]),
                own: false,
            },
        )]
    });
    assert_eq!(out, "for (key in obj) {\n  this.k = key;\n  f(this.k);\n}\n");
}

#[test]
fn filtered_keys() {
    let out = patch("for k of obj when k\n  f k\n", |b| {
        let call = b.call(b.ident("f", 0), vec![b.ident("k", 2)]);
        vec![b.for_of(
            0,
            ForOfParts {
                key: b.ident("k", 0),
                value: None,
                target: b.ident("obj", 0),
                filter: Some(b.ident("k", 1)),
                body: b.block(vec![call]),
                own: false,
            },
        )]
    });
    assert_eq!(out, "for (k in obj) {\n  if (k) {\n    f(k);\n  }\n}\n");
}

#[test]
fn collected_keys_use_the_wrapper() {
    let out = patch("ks = for k of obj then k\n", |b| {
        let lp = b.for_of(
            0,
            ForOfParts {
                key: b.ident("k", 0),
                value: None,
                target: b.ident("obj", 0),
                filter: None,
                body: b.block(vec![b.ident("k", 1)]),
                own: false,
            },
        );
        vec![b.assign(b.ident("ks", 0), lp)]
    });
    assert_eq!(
        out,
        "ks = (() => { result = []; for (k in obj) { result.push(k); } return result; })();\n"
    );
}

#[test]
fn non_repeatable_object_is_hoisted() {
    let out = patch("for k, v of load()\n  f v\n", |b| {
        let call = b.call(b.ident("f", 0), vec![b.ident("v", 1)]);
        vec![b.for_of(
            0,
            ForOfParts {
                key: b.ident("k", 0),
                value: Some(b.ident("v", 0)),
                target: b.call(b.ident("load", 0), vec![]),
                filter: None,
                body: b.block(vec![call]),
                own: false,
            },
        )]
    });
    assert_eq!(
        out,
        "iterable = load();\nfor (k in iterable) {\n  v = iterable[k];\n  f(v);\n}\n"
    );
}
