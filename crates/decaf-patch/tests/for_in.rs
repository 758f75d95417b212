// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `for ... in` loops through the whole pass.

mod common;

use common::{patch, patch_with, try_patch};
use decaf_ast::build::ForInParts;
use decaf_ast::{BinaryOp, Span};
use decaf_patch::{FormattingKind, PatchConfig};
use pretty_assertions::assert_eq;

// --- Statement form ---

#[test]
fn literal_step_counts_by_the_step() {
    let config = PatchConfig { index_binding: "index".to_string(), ..PatchConfig::default() };
    let out = patch_with("for value in target by 2\n  body(value)\n", &config, |b| {
        let body = b.block(vec![b.call(b.ident("body", 0), vec![b.ident("value", 1)])]);
        vec![b.for_in(
            0,
            ForInParts {
                value: Some(b.ident("value", 0)),
                key: None,
                target: b.ident("target", 0),
                step: Some(b.int("2", 0)),
                filter: None,
                body,
            },
        )]
    });
    assert_eq!(
        out,
        "for (index = 0; index < target.length; index += 2) {\n  value = target[index];\n  body(value);\n}\n"
    );
}

#[test]
fn negated_step_counts_down_from_the_end() {
    let out = patch("for x in xs by -1\n  f x\n", |b| {
        let body = b.block(vec![b.call(b.ident("f", 0), vec![b.ident("x", 1)])]);
        vec![b.for_in(
            0,
            ForInParts {
                value: Some(b.ident("x", 0)),
                key: None,
                target: b.ident("xs", 0),
                step: Some(b.negate(b.int("1", 0))),
                filter: None,
                body,
            },
        )]
    });
    assert_eq!(out, "for (i = xs.length - 1; i >= 0; i--) {\n  x = xs[i];\n  f(x);\n}\n");
}

#[test]
fn dynamic_step_is_evaluated_once() {
    let out = patch("for x in xs by n()\n  f x\n", |b| {
        let body = b.block(vec![b.call(b.ident("f", 0), vec![b.ident("x", 1)])]);
        vec![b.for_in(
            0,
            ForInParts {
                value: Some(b.ident("x", 0)),
                key: None,
                target: b.ident("xs", 0),
                step: Some(b.call(b.ident("n", 0), vec![])),
                filter: None,
                body,
            },
        )]
    });
    assert_eq!(
        out,
        "for (i = 0, step = n(); i < xs.length; i += step) {\n  x = xs[i];\n  f(x);\n}\n"
    );
}

#[test]
fn negated_dynamic_step_binds_the_unsigned_step() {
    let out = patch("for x in xs by -n\n  f x\n", |b| {
        let body = b.block(vec![b.call(b.ident("f", 0), vec![b.ident("x", 1)])]);
        vec![b.for_in(
            0,
            ForInParts {
                value: Some(b.ident("x", 0)),
                key: None,
                target: b.ident("xs", 0),
                step: Some(b.negate(b.ident("n", 0))),
                filter: None,
                body,
            },
        )]
    });
    assert_eq!(
        out,
        "for (i = xs.length - 1, step = n; i >= 0; i -= step) {\n  x = xs[i];\n  f(x);\n}\n"
    );
}

#[test]
fn step_binding_avoids_names_in_the_body() {
    let out = patch("for x in xs by n\n  step = x\n", |b| {
        let body = b.block(vec![b.assign(b.ident("step", 0), b.ident("x", 1))]);
        vec![b.for_in(
            0,
            ForInParts {
                value: Some(b.ident("x", 0)),
                key: None,
                target: b.ident("xs", 0),
                step: Some(b.ident("n", 0)),
                filter: None,
                body,
            },
        )]
    });
    assert_eq!(
        out,
        "for (i = 0, step1 = n; i < xs.length; i += step1) {\n  x = xs[i];\n  step = x;\n}\n"
    );
}

#[test]
fn non_repeatable_target_is_hoisted() {
    let out = patch("for x in f()\n  g x\n", |b| {
        let body = b.block(vec![b.call(b.ident("g", 0), vec![b.ident("x", 1)])]);
        vec![b.for_in(
            0,
            ForInParts {
                value: Some(b.ident("x", 0)),
                key: None,
                target: b.call(b.ident("f", 0), vec![]),
                step: None,
                filter: None,
                body,
            },
        )]
    });
    assert_eq!(
        out,
        "iterable = f();\nfor (i = 0; i < iterable.length; i++) {\n  x = iterable[i];\n  g(x);\n}\n"
    );
}

#[test]
fn hoisted_target_binding_avoids_the_value_name() {
    let out = patch("for iterable in f()\n  g iterable\n", |b| {
        let body = b.block(vec![b.call(b.ident("g", 0), vec![b.ident("iterable", 1)])]);
        vec![b.for_in(
            0,
            ForInParts {
                value: Some(b.ident("iterable", 0)),
                key: None,
                target: b.call(b.ident("f", 0), vec![]),
                step: None,
                filter: None,
                body,
            },
        )]
    });
    assert_eq!(
        out,
        "iterable1 = f();\nfor (i = 0; i < iterable1.length; i++) {\n  iterable = iterable1[i];\n  g(iterable);\n}\n"
    );
}

#[test]
fn parenthesized_target_is_hoisted_with_its_parens() {
    let out = patch("for x in (f())\n  g x\n", |b| {
        let body = b.block(vec![b.call(b.ident("g", 0), vec![b.ident("x", 1)])]);
        vec![b.for_in(
            0,
            ForInParts {
                value: Some(b.ident("x", 0)),
                key: None,
                target: b.paren(b.call(b.ident("f", 0), vec![])),
                step: None,
                filter: None,
                body,
            },
        )]
    });
    assert_eq!(
        out,
        "iterable = (f());\nfor (i = 0; i < iterable.length; i++) {\n  x = iterable[i];\n  g(x);\n}\n"
    );
}

#[test]
fn implicit_call_target_is_hoisted_whole() {
    let out = patch("for x in f a\n  g x\n", |b| {
        let body = b.block(vec![b.call(b.ident("g", 0), vec![b.ident("x", 1)])]);
        vec![b.for_in(
            0,
            ForInParts {
                value: Some(b.ident("x", 0)),
                key: None,
                target: b.call(b.ident("f", 0), vec![b.ident("a", 0)]),
                step: None,
                filter: None,
                body,
            },
        )]
    });
    assert_eq!(
        out,
        "iterable = f(a);\nfor (i = 0; i < iterable.length; i++) {\n  x = iterable[i];\n  g(x);\n}\n"
    );
}

#[test]
fn filter_wraps_the_body_one_level_deeper() {
    let out = patch("for x in xs when x > 1\n  f x\n", |b| {
        let body = b.block(vec![b.call(b.ident("f", 0), vec![b.ident("x", 2)])]);
        vec![b.for_in(
            0,
            ForInParts {
                value: Some(b.ident("x", 0)),
                key: None,
                target: b.ident("xs", 0),
                step: None,
                filter: Some(b.binary(BinaryOp::Gt, b.ident("x", 1), b.int("1", 0))),
                body,
            },
        )]
    });
    assert_eq!(
        out,
        "for (i = 0; i < xs.length; i++) {\n  x = xs[i];\n  if (x > 1) {\n    f(x);\n  }\n}\n"
    );
}

#[test]
fn taken_index_name_gets_a_suffix() {
    let out = patch("for x in xs\n  i = x\n", |b| {
        let body = b.block(vec![b.assign(b.ident("i", 0), b.ident("x", 1))]);
        vec![b.for_in(
            0,
            ForInParts {
                value: Some(b.ident("x", 0)),
                key: None,
                target: b.ident("xs", 0),
                step: None,
                filter: None,
                body,
            },
        )]
    });
    assert_eq!(out, "for (i1 = 0; i1 < xs.length; i1++) {\n  x = xs[i1];\n  i = x;\n}\n");
}

#[test]
fn inline_body_stays_on_the_header_line() {
    let out = patch("for x in xs then f x\n", |b| {
        let body = b.block(vec![b.call(b.ident("f", 0), vec![b.ident("x", 1)])]);
        vec![b.for_in(
            0,
            ForInParts {
                value: Some(b.ident("x", 0)),
                key: None,
                target: b.ident("xs", 0),
                step: None,
                filter: None,
                body,
            },
        )]
    });
    assert_eq!(out, "for (i = 0; i < xs.length; i++) { x = xs[i]; f(x); }\n");
}

#[test]
fn member_value_assignee() {
    let out = patch("for @x in xs\n  f @x\n", |b| {
        let body = b.block(vec![b.call(b.ident("f", 0), vec![b.this_member("x", 1)])]);
        vec![b.for_in(
            0,
            ForInParts {
                value: Some(b.this_member("x", 0)),
                key: None,
                target: b.ident("xs", 0),
                step: None,
                filter: None,
                body,
            },
        )]
    });
    assert_eq!(out, "for (i = 0; i < xs.length; i++) {\n  this.x = xs[i];\n  f(this.x);\n}\n");
}

#[test]
fn comments_after_the_header_are_kept_and_reported() {
    let output = try_patch("for x in xs # note\n  f x\n", &PatchConfig::default(), |b| {
        let body = b.block(vec![b.call(b.ident("f", 0), vec![b.ident("x", 1)])]);
        vec![b.for_in(
            0,
            ForInParts {
                value: Some(b.ident("x", 0)),
                key: None,
                target: b.ident("xs", 0),
                step: None,
                filter: None,
                body,
            },
        )]
    })
    .unwrap();
    assert_eq!(output.code, "for (i = 0; i < xs.length; i++) { # note\n  x = xs[i];\n  f(x);\n}\n");
    assert_eq!(output.carried.len(), 1);
    assert_eq!(output.carried[0].kind, FormattingKind::Comment);
    assert_eq!(output.carried[0].text, "# note");
}

#[test]
fn blank_line_after_the_header_is_kept_and_reported() {
    let output = try_patch("for x in xs\n\n  f x\n", &PatchConfig::default(), |b| {
        let body = b.block(vec![b.call(b.ident("f", 0), vec![b.ident("x", 1)])]);
        vec![b.for_in(
            0,
            ForInParts {
                value: Some(b.ident("x", 0)),
                key: None,
                target: b.ident("xs", 0),
                step: None,
                filter: None,
                body,
            },
        )]
    })
    .unwrap();
    assert_eq!(output.code, "for (i = 0; i < xs.length; i++) {\n\n  x = xs[i];\n  f(x);\n}\n");
    assert_eq!(output.carried.len(), 1);
    assert_eq!(output.carried[0].kind, FormattingKind::BlankLine);
    assert_eq!(output.carried[0].span, Span::new(12, 12));
}

// --- Expression form ---

#[test]
fn map_chain_when_the_value_is_used() {
    let out = patch("ys = for x in xs then f x\n", |b| {
        let body = b.block(vec![b.call(b.ident("f", 0), vec![b.ident("x", 1)])]);
        let lp = b.for_in(
            0,
            ForInParts {
                value: Some(b.ident("x", 0)),
                key: None,
                target: b.ident("xs", 0),
                step: None,
                filter: None,
                body,
            },
        );
        vec![b.assign(b.ident("ys", 0), lp)]
    });
    assert_eq!(out, "ys = xs.map((x) => f(x));\n");
}

#[test]
fn filter_then_map_chain() {
    let out = patch("ys = for x in xs when x then f x\n", |b| {
        let body = b.block(vec![b.call(b.ident("f", 0), vec![b.ident("x", 2)])]);
        let lp = b.for_in(
            0,
            ForInParts {
                value: Some(b.ident("x", 0)),
                key: None,
                target: b.ident("xs", 0),
                step: None,
                filter: Some(b.ident("x", 1)),
                body,
            },
        );
        vec![b.assign(b.ident("ys", 0), lp)]
    });
    assert_eq!(out, "ys = xs.filter((x) => x).map((x) => f(x));\n");
}

#[test]
fn object_body_is_parenthesized_in_the_chain() {
    let out = patch("ys = for x in xs then a: x\n", |b| {
        let body = b.block(vec![b.object(vec![(b.ident("a", 0), b.ident("x", 1))])]);
        let lp = b.for_in(
            0,
            ForInParts {
                value: Some(b.ident("x", 0)),
                key: None,
                target: b.ident("xs", 0),
                step: None,
                filter: None,
                body,
            },
        );
        vec![b.assign(b.ident("ys", 0), lp)]
    });
    assert_eq!(out, "ys = xs.map((x) => ({a: x}));\n");
}

#[test]
fn key_with_filter_falls_back_to_the_wrapper() {
    let out = patch("ys = for v, k in xs when v then v\n", |b| {
        let body = b.block(vec![b.ident("v", 2)]);
        let lp = b.for_in(
            0,
            ForInParts {
                value: Some(b.ident("v", 0)),
                key: Some(b.ident("k", 0)),
                target: b.ident("xs", 0),
                step: None,
                filter: Some(b.ident("v", 1)),
                body,
            },
        );
        vec![b.assign(b.ident("ys", 0), lp)]
    });
    assert_eq!(
        out,
        "ys = (() => { result = []; for (k = 0; k < xs.length; k++) { v = xs[k]; if (v) { result.push(v); } } return result; })();\n"
    );
}

#[test]
fn implicit_return_of_a_stepped_loop() {
    let out = patch("f = ->\n  for x in xs by 2\n    x\n", |b| {
        let body = b.block(vec![b.ident("x", 1)]);
        let lp = b.for_in(
            0,
            ForInParts {
                value: Some(b.ident("x", 0)),
                key: None,
                target: b.ident("xs", 0),
                step: Some(b.int("2", 0)),
                filter: None,
                body,
            },
        );
        let function = b.function(vec![], Some(b.block(vec![lp])), 0, false);
        vec![b.assign(b.ident("f", 0), function)]
    });
    assert_eq!(
        out,
        "f = function() {\n  return (() => {\n    result = [];\n    for (i = 0; i < xs.length; i += 2) {\n      x = xs[i];\n      result.push(x);\n    }\n    return result;\n  })();\n};\n"
    );
}
