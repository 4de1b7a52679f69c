//! Benchmarks for compiling and registering handlers.
//!
//! Run with: `cargo bench --package arbor_compiler`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use arbor_compiler::{ClassBuilder, MemoryLoader, Object, Param, Registrar};
use arbor_dispatch::{BasicSource, Dispatcher};
use arbor_foundation::{Type, Value};

struct Handler;

fn handler(data: String) -> Object {
    let class = ClassBuilder::<Handler>::new("Handler")
        .command_data(data)
        .method("run", vec![Param::source()], Type::Int, |_, _| Ok(Value::Int(1)))
        .method(
            "add",
            vec![Param::source(), Param::new("n", Type::Int)],
            Type::Int,
            |_, args| Ok(Value::Int(args.int(1)?)),
        )
        .build();
    Object::new(class, Handler)
}

fn wide_input(children: usize) -> String {
    let mut src = String::from("name = 'wide'\n");
    for i in 0..children {
        src.push_str(&format!(
            "literal('child{i}') {{\n  description = 'Child {i}'\n  argument('n', int(min = 0)) = add()\n  executes = run()\n}}\n"
        ));
    }
    src
}

// =============================================================================
// Compile Benchmarks
// =============================================================================

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    let registrar = Registrar::new();

    for children in [1, 10, 100] {
        let input = wide_input(children);
        let object = handler(input.clone());
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::new("wide", children), &object, |b, object| {
            b.iter(|| registrar.compile(black_box(object)));
        });
    }

    group.finish();
}

fn bench_paste(c: &mut Criterion) {
    let shared = wide_input(20).replacen("name = 'wide'\n", "", 1);
    let registrar = Registrar::new().with_loader(MemoryLoader::new().with("shared.cmd", shared));
    let object = handler("name = 'pasted'\n#paste(shared.cmd)\n".to_string());

    c.bench_function("compile/paste", |b| {
        b.iter(|| registrar.compile(black_box(&object)));
    });
}

// =============================================================================
// Execution Benchmarks
// =============================================================================

fn bench_execute(c: &mut Criterion) {
    let mut dispatcher = Dispatcher::new();
    let object = handler(wide_input(100));
    if let Err(error) = Registrar::new().register(&object, &mut dispatcher) {
        panic!("benchmark handler failed to register: {error}");
    }
    let source = BasicSource::new("bench").shared();

    c.bench_function("execute/argument", |b| {
        b.iter(|| dispatcher.execute(black_box("wide child50 42"), source.clone()));
    });
}

criterion_group!(benches, bench_compile, bench_paste, bench_execute);
criterion_main!(benches);
