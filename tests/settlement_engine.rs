use chrono::NaiveDate;
use housepot::selector::{RECURRING_NOTE_PREFIX, select, select_relevant};
use housepot::{
    Expense, Intent, PerParticipant, Provenance, RecurringTemplate, Roster, SETTLED_TOLERANCE,
    SalaryRecord, SettlementResult, Snapshot, SplitMode, Transfer, minimize_transfers, settle,
    settle_snapshot,
};
use rust_decimal::Decimal;

fn d(raw: &str) -> Decimal {
    raw.parse().expect("decimal")
}

fn day(y: i32, m: u32, dd: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, dd).expect("date")
}

fn abc() -> Roster {
    Roster::from_ids(["A", "B", "C"]).expect("roster")
}

fn salaries_50_30_20(month: &str) -> SalaryRecord {
    SalaryRecord::empty(month.parse().expect("month"))
        .with_salary("A", d("50000"))
        .with_salary("B", d("30000"))
        .with_salary("C", d("20000"))
}

fn transfer(from: &str, to: &str, amount: &str) -> Transfer {
    Transfer {
        from: from.into(),
        to: to.into(),
        amount: d(amount),
    }
}

fn get(map: &PerParticipant, id: &str) -> Decimal {
    map.get(&id.into())
}

fn assert_close(actual: Decimal, expected: Decimal) {
    assert!(
        (actual - expected).abs() < SETTLED_TOLERANCE,
        "expected {expected}, got {actual}"
    );
}

fn apply_transfers(balances: &PerParticipant, transfers: &[Transfer], roster: &Roster) -> PerParticipant {
    PerParticipant::from_fn(roster, |id| {
        let mut b = balances.get(id);
        for t in transfers {
            if &t.from == id {
                b += t.amount;
            }
            if &t.to == id {
                b -= t.amount;
            }
        }
        b
    })
}

fn assert_invariants(result: &SettlementResult, roster: &Roster) {
    assert_close(result.paid.total(), result.total_expense);
    assert_close(result.balances.total(), Decimal::ZERO);

    // Each transfer is rounded to cents, so allow half a cent per transfer on top.
    let slack = SETTLED_TOLERANCE + d("0.005") * Decimal::from(result.transfers.len());

    let positive: Decimal = result
        .balances
        .iter()
        .map(|(_, b)| b)
        .filter(|b| *b > Decimal::ZERO)
        .sum();
    let transferred: Decimal = result.transfers.iter().map(|t| t.amount).sum();
    assert!((transferred - positive).abs() < slack, "{transferred} vs {positive}");

    let after = apply_transfers(&result.balances, &result.transfers, roster);
    for (id, b) in after.iter() {
        assert!(b.abs() < slack, "{id} left with {b}");
    }

    let debtors = result.balances.iter().filter(|(_, b)| *b < -SETTLED_TOLERANCE).count();
    let creditors = result.balances.iter().filter(|(_, b)| *b > SETTLED_TOLERANCE).count();
    assert!(result.transfers.len() <= (debtors + creditors).saturating_sub(1));
}

#[test]
fn salary_ratio_split_settles_towards_payer() {
    let roster = abc();
    let month = "2024-03".parse().expect("month");
    let expenses = vec![
        Expense::shared("A", d("1000"), day(2024, 3, 10))
            .with_mode(SplitMode::SalaryRatio)
            .with_group(["A", "B", "C"]),
    ];

    let result = settle(month, &roster, &expenses, &[], &salaries_50_30_20("2024-03"));

    assert_eq!(get(&result.shares, "A"), d("500"));
    assert_eq!(get(&result.shares, "B"), d("300"));
    assert_eq!(get(&result.shares, "C"), d("200"));
    assert_eq!(get(&result.balances, "A"), d("500"));
    assert_eq!(get(&result.balances, "B"), d("-300"));
    assert_eq!(get(&result.balances, "C"), d("-200"));
    assert_eq!(
        result.transfers,
        vec![transfer("B", "A", "300"), transfer("C", "A", "200")]
    );
    assert_invariants(&result, &roster);
}

#[test]
fn equal_split_intent_divides_evenly_and_keeps_roster_order_on_ties() {
    let roster = abc();
    let month = "2024-03".parse().expect("month");
    let expenses = vec![
        Expense::shared("B", d("300"), day(2024, 3, 2))
            .with_intent(Intent::EqualSplit)
            .with_group(["A", "B", "C"]),
    ];

    let result = settle(month, &roster, &expenses, &[], &salaries_50_30_20("2024-03"));

    for id in ["A", "B", "C"] {
        assert_eq!(get(&result.shares, id), d("100"));
    }
    assert_eq!(get(&result.balances, "A"), d("-100"));
    assert_eq!(get(&result.balances, "B"), d("200"));
    assert_eq!(get(&result.balances, "C"), d("-100"));
    assert_eq!(
        result.transfers,
        vec![transfer("A", "B", "100"), transfer("C", "B", "100")]
    );
}

#[test]
fn equal_split_intent_overrides_recorded_mode() {
    let roster = abc();
    let month = "2024-03".parse().expect("month");
    let expenses = vec![
        Expense::shared("B", d("300"), day(2024, 3, 2))
            .with_intent(Intent::EqualSplit)
            .with_mode(SplitMode::SalaryRatio),
    ];

    let result = settle(month, &roster, &expenses, &[], &salaries_50_30_20("2024-03"));
    assert_eq!(get(&result.shares, "A"), d("100"));
}

#[test]
fn gift_is_outside_settlement_but_reported() {
    let roster = abc();
    let month = "2024-03".parse().expect("month");
    let expenses = vec![
        Expense::shared("C", d("500"), day(2024, 3, 15)).with_intent(Intent::Gift),
        Expense::shared("A", d("200"), day(2024, 3, 16)).with_intent(Intent::Loan),
    ];

    let result = settle(month, &roster, &expenses, &[], &salaries_50_30_20("2024-03"));

    assert_eq!(result.total_expense, Decimal::ZERO);
    assert_eq!(result.shares.total(), Decimal::ZERO);
    assert_eq!(result.paid.total(), Decimal::ZERO);
    assert_eq!(get(&result.outside_settlement, "C"), d("500"));
    assert_eq!(get(&result.outside_settlement, "A"), d("200"));
    assert!(result.is_settled());
}

#[test]
fn percentage_split_uses_custom_points() {
    let roster = abc();
    let month = "2024-03".parse().expect("month");
    let expenses = vec![
        Expense::shared("A", d("1000"), day(2024, 3, 1))
            .with_mode(SplitMode::Percentage)
            .with_group(["A", "B"])
            .with_custom_split([("A", d("60")), ("B", d("40"))]),
    ];

    let result = settle(month, &roster, &expenses, &[], &salaries_50_30_20("2024-03"));

    assert_eq!(get(&result.shares, "A"), d("600"));
    assert_eq!(get(&result.shares, "B"), d("400"));
    assert_eq!(get(&result.shares, "C"), Decimal::ZERO);
    assert_eq!(result.transfers, vec![transfer("B", "A", "400")]);
    assert_invariants(&result, &roster);
}

#[test]
fn percentage_split_treats_missing_entries_as_zero() {
    let roster = abc();
    let month = "2024-03".parse().expect("month");
    let expenses = vec![
        Expense::shared("A", d("1000"), day(2024, 3, 1))
            .with_mode(SplitMode::Percentage)
            .with_custom_split([("A", d("70"))]),
    ];

    let result = settle(month, &roster, &expenses, &[], &salaries_50_30_20("2024-03"));

    assert_eq!(get(&result.shares, "A"), d("700"));
    assert_eq!(get(&result.shares, "B"), Decimal::ZERO);
    assert_eq!(get(&result.shares, "C"), Decimal::ZERO);
}

#[test]
fn custom_mode_without_custom_split_falls_back_to_salary_ratio() {
    let roster = abc();
    let month = "2024-03".parse().expect("month");
    let expenses = vec![
        Expense::shared("A", d("1000"), day(2024, 3, 1)).with_mode(SplitMode::Percentage),
    ];

    let result = settle(month, &roster, &expenses, &[], &salaries_50_30_20("2024-03"));

    assert_eq!(get(&result.shares, "A"), d("500"));
    assert_eq!(get(&result.shares, "B"), d("300"));
}

#[test]
fn fixed_amount_split_assigns_values_directly() {
    let roster = abc();
    let month = "2024-03".parse().expect("month");
    let expenses = vec![
        Expense::shared("C", d("300"), day(2024, 3, 9))
            .with_mode(SplitMode::FixedAmount)
            .with_group(["A", "B"])
            .with_custom_split([("A", d("100")), ("B", d("200"))]),
    ];

    let result = settle(month, &roster, &expenses, &[], &salaries_50_30_20("2024-03"));

    assert_eq!(get(&result.shares, "A"), d("100"));
    assert_eq!(get(&result.shares, "B"), d("200"));
    assert_eq!(get(&result.balances, "C"), d("300"));
    assert_eq!(
        result.transfers,
        vec![transfer("B", "C", "200"), transfer("A", "C", "100")]
    );
}

#[test]
fn zero_salary_group_contributes_no_shares() {
    let roster = abc();
    let month = "2024-03".parse().expect("month");
    let expenses = vec![Expense::shared("A", d("1000"), day(2024, 3, 1))];
    let no_salaries = SalaryRecord::empty(month);

    let result = settle(month, &roster, &expenses, &[], &no_salaries);

    assert_eq!(result.shares.total(), Decimal::ZERO);
    assert_eq!(get(&result.paid, "A"), d("1000"));
    assert_eq!(get(&result.balances, "A"), d("1000"));
    assert!(result.transfers.is_empty());
}

#[test]
fn uneven_equal_split_rounds_transfers_to_cents() {
    let roster = abc();
    let month = "2024-03".parse().expect("month");
    let expenses = vec![
        Expense::shared("A", d("100"), day(2024, 3, 1)).with_mode(SplitMode::Equal),
    ];

    let result = settle(month, &roster, &expenses, &[], &salaries_50_30_20("2024-03"));

    assert_close(result.shares.total(), d("100"));
    assert_eq!(
        result.transfers,
        vec![transfer("B", "A", "33.33"), transfer("C", "A", "33.33")]
    );
    assert_invariants(&result, &roster);
}

#[test]
fn missing_or_empty_group_means_whole_roster_and_strangers_are_ignored() {
    let roster = abc();
    let month = "2024-03".parse().expect("month");
    let mut empty_group = Expense::shared("A", d("300"), day(2024, 3, 1)).with_mode(SplitMode::Equal);
    empty_group.split_between = Some(Vec::new());
    let with_stranger = Expense::shared("B", d("200"), day(2024, 3, 2))
        .with_mode(SplitMode::Equal)
        .with_group(["A", "B", "Z"]);

    let result = settle(
        month,
        &roster,
        &[empty_group, with_stranger],
        &[],
        &salaries_50_30_20("2024-03"),
    );

    assert_eq!(get(&result.shares, "A"), d("200"));
    assert_eq!(get(&result.shares, "B"), d("200"));
    assert_eq!(get(&result.shares, "C"), d("100"));
    assert_invariants(&result, &roster);
}

#[test]
fn recurring_template_materializes_without_recorded_expenses() {
    let roster = abc();
    let month = "2024-03".parse().expect("month");
    let rent = RecurringTemplate::shared("A", d("900"))
        .with_mode(SplitMode::SalaryRatio)
        .with_note("Rent");

    let result = settle(
        month,
        &roster,
        &[],
        std::slice::from_ref(&rent),
        &salaries_50_30_20("2024-03"),
    );

    assert_eq!(result.total_expense, d("900"));
    assert_eq!(get(&result.shares, "A"), d("450"));
    assert_eq!(get(&result.shares, "B"), d("270"));
    assert_eq!(get(&result.shares, "C"), d("180"));
    assert_eq!(
        result.transfers,
        vec![transfer("B", "A", "270"), transfer("C", "A", "180")]
    );

    let relevant = select_relevant(month, &[], std::slice::from_ref(&rent));
    assert_eq!(relevant.len(), 1);
    assert_eq!(relevant[0].provenance, Provenance::Recurring(rent.id));
    assert_eq!(relevant[0].date, day(2024, 3, 1));
    assert_eq!(relevant[0].note, format!("{RECURRING_NOTE_PREFIX}Rent"));
}

#[test]
fn selector_skips_other_months_personal_and_inactive_entries() {
    let month = "2024-03".parse().expect("month");
    let expenses = vec![
        Expense::shared("A", d("10"), day(2024, 3, 31)),
        Expense::shared("A", d("20"), day(2024, 4, 1)),
        Expense::shared("A", d("30"), day(2024, 2, 29)),
        Expense::personal("B", d("40"), day(2024, 3, 5)),
        Expense::shared("C", d("50"), day(2024, 3, 5)).with_intent(Intent::Gift),
    ];
    let templates = vec![
        RecurringTemplate::shared("A", d("100")).inactive(),
        RecurringTemplate::personal("B", d("200")).on_behalf_of("C"),
        RecurringTemplate::shared("C", d("300")).with_intent(Intent::Loan),
        RecurringTemplate::shared("B", d("400")).with_intent(Intent::EqualSplit),
    ];

    let selection = select(month, &expenses, &templates);

    let relevant: Vec<_> = selection.relevant.iter().map(|e| e.amount).collect();
    assert_eq!(relevant, vec![d("10"), d("400")]);
    assert_eq!(selection.relevant[0].provenance, Provenance::Recorded(expenses[0].id));
    let outside: Vec<_> = selection.outside.iter().map(|e| e.amount).collect();
    assert_eq!(outside, vec![d("50"), d("300")]);
}

#[test]
fn mixed_modes_conserve_totals_and_rerun_identically() {
    let roster = Roster::from_ids(["A", "B", "C", "D"]).expect("roster");
    let month = "2024-06".parse().expect("month");
    let salaries = SalaryRecord::empty(month)
        .with_salary("A", d("41000"))
        .with_salary("B", d("27500"))
        .with_salary("C", d("12345.67"))
        .with_salary("D", d("9000"));
    let expenses = vec![
        Expense::shared("A", d("1234.56"), day(2024, 6, 1)),
        Expense::shared("B", d("99.99"), day(2024, 6, 3)).with_mode(SplitMode::Equal),
        Expense::shared("C", d("700"), day(2024, 6, 4))
            .with_mode(SplitMode::Percentage)
            .with_custom_split([("A", d("25")), ("B", d("25")), ("C", d("25")), ("D", d("25"))]),
        Expense::shared("D", d("450"), day(2024, 6, 5))
            .with_mode(SplitMode::FixedAmount)
            .with_group(["B", "D"])
            .with_custom_split([("B", d("150")), ("D", d("300"))]),
        Expense::shared("A", d("61.10"), day(2024, 6, 20))
            .with_mode(SplitMode::SalaryRatio)
            .with_group(["C", "D"]),
    ];
    let templates = vec![RecurringTemplate::shared("B", d("1500")).with_note("Rent")];

    let first = settle(month, &roster, &expenses, &templates, &salaries);
    let second = settle(month, &roster, &expenses, &templates, &salaries);

    assert_eq!(first, second);
    assert_close(first.total_expense, d("4045.65"));
    assert_close(first.shares.total(), first.total_expense);
    assert_invariants(&first, &roster);
}

#[test]
fn minimizer_matches_largest_debts_first() {
    let roster = Roster::from_ids(["A", "B", "C", "D"]).expect("roster");
    let balances = PerParticipant::from_fn(&roster, |id| match id.as_str() {
        "A" => d("100"),
        "B" => d("50"),
        "C" => d("-120"),
        _ => d("-30"),
    });

    let transfers = minimize_transfers(&balances);

    assert_eq!(
        transfers,
        vec![
            transfer("C", "A", "100"),
            transfer("C", "B", "20"),
            transfer("D", "B", "30"),
        ]
    );
}

#[test]
fn minimizer_ignores_sub_cent_drift() {
    let roster = abc();
    let balances = PerParticipant::from_fn(&roster, |id| match id.as_str() {
        "A" => d("0.005"),
        "B" => d("-0.004"),
        _ => d("-0.001"),
    });

    assert!(minimize_transfers(&balances).is_empty());
}

#[test]
fn snapshot_settlement_carries_salaries_forward() {
    let roster = abc();
    let snapshot = Snapshot {
        expenses: vec![Expense::shared("A", d("1000"), day(2024, 5, 2))],
        recurring: Vec::new(),
        salaries: vec![salaries_50_30_20("2024-02")],
    };

    let result = settle_snapshot("2024-05".parse().expect("month"), &roster, &snapshot);

    assert_eq!(get(&result.salaries, "B"), d("30000"));
    assert_eq!(get(&result.shares, "B"), d("300"));
}

#[test]
fn oversized_percentage_degrades_to_zero_share() {
    let roster = abc();
    let month = "2024-03".parse().expect("month");
    let expenses = vec![
        Expense::shared("A", d("1000"), day(2024, 3, 1))
            .with_mode(SplitMode::Percentage)
            .with_group(["A", "B"])
            .with_custom_split([("A", d("10000000000000000000000000000")), ("B", d("0"))]),
    ];

    let result = settle(month, &roster, &expenses, &[], &salaries_50_30_20("2024-03"));

    assert_eq!(result.shares.total(), Decimal::ZERO);
    assert_eq!(get(&result.balances, "A"), d("1000"));
    assert!(result.transfers.is_empty());
}

#[test]
fn large_salary_ratio_split_stays_exact() {
    let roster = abc();
    let month = "2024-03".parse().expect("month");
    let salaries = SalaryRecord::empty(month)
        .with_salary("A", d("100000000000000"))
        .with_salary("B", d("100000000000000"));
    let expenses = vec![Expense::shared("A", d("1000000000000000"), day(2024, 3, 1))];

    let result = settle(month, &roster, &expenses, &[], &salaries);

    assert_eq!(get(&result.shares, "A"), d("500000000000000"));
    assert_eq!(get(&result.shares, "B"), d("500000000000000"));
    assert_eq!(get(&result.shares, "C"), Decimal::ZERO);
    assert_eq!(
        result.transfers,
        vec![transfer("B", "A", "500000000000000")]
    );
    assert_invariants(&result, &roster);
}

#[test]
fn recurring_template_carries_its_custom_split() {
    let roster = abc();
    let month = "2024-03".parse().expect("month");
    let internet = RecurringTemplate::shared("C", d("80"))
        .with_mode(SplitMode::Percentage)
        .with_custom_split([("A", d("50")), ("B", d("25")), ("C", d("25"))])
        .with_category("Internet");

    let result = settle(
        month,
        &roster,
        &[],
        std::slice::from_ref(&internet),
        &salaries_50_30_20("2024-03"),
    );

    assert_eq!(get(&result.shares, "A"), d("40"));
    assert_eq!(get(&result.shares, "B"), d("20"));
    assert_eq!(get(&result.shares, "C"), d("20"));
    assert_eq!(
        result.transfers,
        vec![transfer("A", "C", "40"), transfer("B", "C", "20")]
    );
    assert_eq!(
        select_relevant(month, &[], std::slice::from_ref(&internet))[0].category,
        Some("Internet")
    );
    assert_invariants(&result, &roster);
}
