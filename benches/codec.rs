use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lvmconf::{
    from_str, from_str_into, lex_str, render, schema, to_string, to_string_map, Ast, Decoder,
    FieldMap,
};

#[derive(Default)]
struct Lvm {
    config: Config,
    devices: Devices,
}

#[derive(Default)]
struct Config {
    checks: i64,
    profile_dir: String,
}

#[derive(Default)]
struct Devices {
    dir: String,
    scan_lvs: i64,
}

schema! { impl Schema for Lvm { "config" => config, "devices" => devices } }
schema! { impl Section for Config { "checks" => checks, "profile_dir" => profile_dir } }
schema! { impl Section for Devices { "dir" => dir, "scan_lvs" => scan_lvs } }

fn sample() -> Lvm {
    Lvm {
        config: Config {
            checks: 1,
            profile_dir: "/etc/lvm/profile".to_string(),
        },
        devices: Devices {
            dir: "/dev".to_string(),
            scan_lvs: 0,
        },
    }
}

/// `sections` sections of ten assignments each, with comments and lists.
fn document(sections: usize) -> String {
    let mut out = String::from("# generated for benchmarks\n");
    for s in 0..sections {
        out.push_str(&format!("section_{} {{\n", s));
        for k in 0..10 {
            match k % 3 {
                0 => out.push_str(&format!("\tint_{} = {} # counter\n", k, k * 1024)),
                1 => out.push_str(&format!("\tstr_{} = \"/dev/vg{}/lv{}\"\n", k, s, k)),
                _ => out.push_str(&format!("\tlist_{} = [ \"a|.*|\", \"r|/dev/sd{}|\" ]\n", k, k)),
            }
        }
        out.push_str("}\n\n");
    }
    out
}

fn benchmark_lex(c: &mut Criterion) {
    let mut group = c.benchmark_group("lex");
    for size in [1, 10, 100].iter() {
        let input = document(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| lex_str(black_box(input)))
        });
    }
    group.finish();
}

fn benchmark_ast_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("ast_round_trip");
    for size in [1, 10, 100].iter() {
        let tokens = lex_str(&document(*size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &tokens, |b, tokens| {
            b.iter(|| {
                let ast = Ast::from_tokens(black_box(tokens)).unwrap();
                render(&ast.tokens())
            })
        });
    }
    group.finish();
}

fn benchmark_decode_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_map");
    for size in [1, 10, 100].iter() {
        let input = document(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| from_str(black_box(input)))
        });
    }
    group.finish();
}

fn benchmark_encode_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_map");
    for size in [1, 10, 100].iter() {
        let map = from_str(&document(*size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &map, |b, map| {
            b.iter(|| to_string_map(black_box(map)))
        });
    }
    group.finish();
}

fn benchmark_structured(c: &mut Criterion) {
    let lvm = sample();
    let text = to_string(&lvm).unwrap();

    c.bench_function("encode_structured", |b| b.iter(|| to_string(black_box(&lvm))));

    c.bench_function("decode_structured", |b| {
        b.iter(|| {
            let mut target = Lvm::default();
            from_str_into(black_box(&text), &mut target)
        })
    });

    let fields = FieldMap::<Lvm>::new().unwrap();
    let tokens = lex_str(&text).unwrap();
    let decoder = Decoder::new();
    c.bench_function("decode_structured_prebuilt_fields", |b| {
        b.iter(|| {
            let mut target = Lvm::default();
            decoder.decode_into_with(&fields, black_box(&tokens), &mut target)
        })
    });
}

criterion_group!(
    benches,
    benchmark_lex,
    benchmark_ast_round_trip,
    benchmark_decode_map,
    benchmark_encode_map,
    benchmark_structured
);
criterion_main!(benches);
