use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ledger_core::{compute_balances, BalanceOptions, Group, Participant, Roster, Transaction};
use rust_decimal::Decimal;
use settlement::{aggregate_by_group, DebtSimplifier, PriorityRule};

/// Roster of `families` four-person families plus `families` individuals
fn build_roster(families: usize) -> Roster {
    let mut participants = Vec::new();
    let mut groups = vec![Group::new("IND", "Individuals", Vec::<String>::new()).individuals()];

    for f in 0..families {
        let group_id = format!("F{}", f);
        let group = Group::new(group_id.clone(), format!("Family {}", f), Vec::<String>::new());
        groups.push(if f == 0 { group.as_lead_payer() } else { group });

        for m in 0..4 {
            participants.push(
                Participant::new(format!("F{}M{}", f, m), format!("Member {}-{}", f, m))
                    .in_group(group_id.clone()),
            );
        }
        participants.push(
            Participant::new(format!("I{}", f), format!("Solo {}", f)).in_group("IND"),
        );
    }

    Roster::new(participants, groups).expect("benchmark roster")
}

fn build_transactions(roster: &Roster, count: usize) -> Vec<Transaction> {
    let ids: Vec<String> = roster
        .participants()
        .iter()
        .map(|p| p.id.as_str().to_string())
        .collect();

    (0..count)
        .map(|idx| {
            let payer = ids[idx % ids.len()].as_str();
            let width = 2 + idx % 7;
            let beneficiaries: Vec<&str> = (0..width)
                .map(|k| ids[(idx * 31 + k * 7) % ids.len()].as_str())
                .collect();
            let amount = Decimal::new(1_000 + (idx as i64 % 50_000), 2);

            if idx % 10 == 9 {
                Transaction::repayment(format!("r{}", idx), amount, payer, beneficiaries[0])
            } else {
                Transaction::expense(format!("t{}", idx), amount, Some(payer), beneficiaries)
            }
        })
        .collect()
}

fn bench_compute_balances(c: &mut Criterion) {
    let roster = build_roster(20);
    let ids = roster.participant_ids();
    let mut group = c.benchmark_group("compute_balances");

    for count in [100usize, 1_000, 10_000] {
        let txs = build_transactions(&roster, count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &txs, |b, txs| {
            b.iter(|| black_box(compute_balances(txs, &ids, BalanceOptions::default())))
        });
    }

    group.finish();
}

fn bench_simplify(c: &mut Criterion) {
    let simplifier = DebtSimplifier::default();
    let mut group = c.benchmark_group("simplify_debts");

    for families in [5usize, 50, 500] {
        let roster = build_roster(families);
        let txs = build_transactions(&roster, families * 40);
        let sheet = compute_balances(&txs, &roster.participant_ids(), BalanceOptions::default());
        let nodes = aggregate_by_group(&sheet, &roster).expect("benchmark nodes");

        group.bench_with_input(BenchmarkId::from_parameter(nodes.len()), &nodes, |b, nodes| {
            b.iter(|| {
                black_box(
                    simplifier
                        .simplify(nodes, &PriorityRule::LeadPayerFlag)
                        .expect("settled view"),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compute_balances, bench_simplify);
criterion_main!(benches);
