use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kdd_clean::preprocessing::{fill_kc_op_null, reset_index, CleaningPipeline};
use polars::prelude::*;
use rand::prelude::*;

fn create_raw_log(n_rows: usize) -> DataFrame {
    let mut rng = rand::thread_rng();

    let mut students = Vec::with_capacity(n_rows);
    let mut hierarchy = Vec::with_capacity(n_rows);
    let mut problems = Vec::with_capacity(n_rows);
    let mut steps = Vec::with_capacity(n_rows);
    let mut error_durations = Vec::with_capacity(n_rows);
    let mut first_attempt = Vec::with_capacity(n_rows);
    let mut kcs = Vec::with_capacity(n_rows);
    let mut opportunities = Vec::with_capacity(n_rows);

    for _ in 0..n_rows {
        let unit = rng.gen_range(0..20);
        let correct = rng.gen_bool(0.7);
        students.push(format!("s{}", rng.gen_range(0..200)));
        hierarchy.push(format!("Unit {unit}, Section {unit}-{}", rng.gen_range(0..5)));
        problems.push(format!("P{}", rng.gen_range(0..50)));
        steps.push(format!("x+{} = {}", rng.gen_range(0..10), rng.gen_range(0..10)));
        error_durations.push(if correct { None } else { Some(rng.gen::<f64>() * 60.0) });
        first_attempt.push(i64::from(correct));
        let kc = rng.gen_bool(0.6).then(|| format!("KC{}", rng.gen_range(0..30)));
        opportunities.push(kc.as_ref().map(|_| "1".to_string()));
        kcs.push(kc);
    }

    let n = n_rows as i64;
    let text = |v: &str| vec![v.to_string(); n_rows];
    df!(
        "Row" => (1..=n).collect::<Vec<i64>>(),
        "Anon Student Id" => students,
        "Problem Hierarchy" => hierarchy,
        "Problem Name" => problems,
        "Problem View" => vec![1.0; n_rows],
        "Step Name" => steps,
        "Step Start Time" => text("t0"),
        "First Transaction Time" => text("t1"),
        "Correct Transaction Time" => text("t1"),
        "Step End Time" => text("t2"),
        "Step Duration (sec)" => vec![Some(5.0); n_rows],
        "Correct Step Duration (sec)" => vec![Some(5.0); n_rows],
        "Error Step Duration (sec)" => error_durations,
        "Correct First Attempt" => first_attempt,
        "Incorrects" => vec![0i64; n_rows],
        "Hints" => vec![0i64; n_rows],
        "Corrects" => vec![1i64; n_rows],
        "KC(SubSkills)" => kcs.clone(),
        "Opportunity(SubSkills)" => opportunities.clone(),
        "KC(KTracedSkills)" => kcs.clone(),
        "Opportunity(KTracedSkills)" => opportunities.clone(),
        "KC(Rules)" => kcs,
        "Opportunity(Rules)" => opportunities
    )
    .unwrap()
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);

    for n_rows in [1000, 10000, 50000].iter() {
        let raw = create_raw_log(*n_rows);

        group.bench_with_input(BenchmarkId::new("run", n_rows), &raw, |b, raw| {
            b.iter(|| {
                let mut pipeline = CleaningPipeline::new();
                pipeline.run(black_box(raw)).unwrap()
            })
        });
    }

    group.finish();
}

fn bench_opportunity_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("opportunity_fill");

    for n_rows in [10000, 100000].iter() {
        let mut rng = rand::thread_rng();
        let students: Vec<String> = (0..*n_rows).map(|_| format!("s{}", rng.gen_range(0..500))).collect();
        let kcs: Vec<String> = (0..*n_rows).map(|_| format!("KC{}", rng.gen_range(0..40))).collect();
        let opportunities: Vec<Option<&str>> = vec![None; *n_rows];
        let df = reset_index(
            &df!(
                "student_id" => students,
                "kc_rules" => kcs,
                "opp_rules" => opportunities
            )
            .unwrap(),
        )
        .unwrap();

        group.bench_with_input(BenchmarkId::new("fill", n_rows), &df, |b, df| {
            b.iter(|| fill_kc_op_null(black_box(df), "kc_rules", "opp_rules").unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline, bench_opportunity_fill);
criterion_main!(benches);
