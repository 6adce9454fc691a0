use criterion::{Criterion, black_box, criterion_group, criterion_main};

use argguard::{Guard, Schemas, Value, expr::TypeExpr, schema};

fn several_schemas() -> Schemas {
    vec![
        schema! { one1: "obj", tow1: "opt bool" },
        schema! { one2: "str", tow2: "opt obj", three2: "opt bool" },
        schema! { one3: "str", tow3: "opt str", three3: "opt bool" },
    ]
    .into()
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_type_expression", |b| {
        b.iter(|| {
            black_box(TypeExpr::parse(black_box("opt str or num arr arr or func")));
        })
    });
}

fn bench_check(c: &mut Criterion) {
    let guard = Guard::new();
    let simple: Schemas = schema! { one: "string", two: "number array", three: "opt func" }.into();
    let values = Value::Array(vec![
        "hi".into(),
        Value::Array((0..64).map(Value::from).collect()),
    ]);

    c.bench_function("check_single_schema", |b| {
        b.iter(|| {
            black_box(guard.check(&values, &simple).is_ok());
        })
    });

    let several = several_schemas();
    let values = Value::Array(vec!["str1".into(), "str2".into(), true.into()]);
    c.bench_function("check_several_schemas_strict", |b| {
        b.iter(|| {
            black_box(guard.check_strict(&values, &several).is_ok());
        })
    });

    let named: Value = [("one", "a"), ("two", "b"), ("three", "c")].into_iter().collect();
    let schema: Schemas = schema! { one: "s", two: "s", three: "s" }.into();
    c.bench_function("check_named_arguments", |b| {
        b.iter(|| {
            black_box(guard.check(&named, &schema).is_ok());
        })
    });
}

criterion_group!(benches, bench_parse, bench_check);
criterion_main!(benches);
