use criterion::{black_box, criterion_group, criterion_main, Criterion};
use secpol_branch::{BranchResolver, ProjectBranches, ResolverOptions};
use secpol_document::{BranchException, BranchScope, BranchType, PolicyRule};

fn project(branch_count: usize) -> ProjectBranches {
    let branches = (0..branch_count).map(|i| match i % 3 {
        0 => format!("release/{i}"),
        1 => format!("feature/{i}"),
        _ => format!("topic-{i}"),
    });
    ProjectBranches::new(branches)
        .with_protected(["release/*", "topic-2"])
        .with_default_branch("release/0")
}

fn bench_resolve(c: &mut Criterion) {
    let project = project(5_000);
    let resolver = BranchResolver::new(&project, ResolverOptions::with_exceptions("group/app"));
    let rules = [
        PolicyRule::pipeline(BranchScope::branches(["feature/*", "topic-?"])),
        PolicyRule::scan_finding(
            BranchScope::branch_type(BranchType::Protected)
                .with_exception(BranchException::Name("release/1*".to_string())),
        ),
    ];

    c.bench_function("scan_execution_branches/5k", |b| {
        b.iter(|| resolver.scan_execution_branches(black_box(&rules)))
    });
    c.bench_function("scan_result_branches/5k", |b| {
        b.iter(|| resolver.scan_result_branches(black_box(&rules)))
    });
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
