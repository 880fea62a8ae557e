use packs::{solve, Packs};

const DEFAULT_PACKS: [i64; 5] = [250, 500, 1000, 2000, 5000];
const PRIME_PACKS: [i64; 5] = [23, 31, 53, 151, 757];

fn packs(entries: &[(i64, u64)]) -> Packs {
    entries.iter().copied().collect()
}

fn check(quantity: i64, sizes: &[i64], expected: &[(i64, u64)]) {
    let actual = solve(quantity, sizes).unwrap();
    assert_eq!(actual, packs(expected), "quantity {} sizes {:?}", quantity, sizes);
}

#[test]
fn test_default_packs() {
    check(1, &DEFAULT_PACKS, &[(250, 1)]);
    check(250, &DEFAULT_PACKS, &[(250, 1)]);
    check(251, &DEFAULT_PACKS, &[(500, 1)]);
    check(501, &DEFAULT_PACKS, &[(250, 1), (500, 1)]);
    check(12001, &DEFAULT_PACKS, &[(250, 1), (2000, 1), (5000, 2)]);
}

#[test]
fn test_single_pack_size() {
    check(500, &[50], &[(50, 10)]);
    // 16 * 33 = 528
    check(500, &[33], &[(33, 16)]);
}

#[test]
fn test_prime_packs() {
    check(32, &PRIME_PACKS, &[(23, 2)]);
    check(500, &PRIME_PACKS, &[(23, 4), (53, 2), (151, 2)]);
    check(758, &PRIME_PACKS, &[(23, 4), (31, 2), (151, 4)]);
    check(508, &[3, 23, 31, 53, 151, 757], &[(3, 3), (23, 2), (151, 3)]);
}

#[test]
fn test_off_by_one_pack() {
    check(500, &[1, 100, 200, 499], &[(1, 1), (499, 1)]);
}

#[test]
fn test_fewest_packs_beats_greedy() {
    // largest first would ship 3x 1000 + 1x 200 = 3200, but 3100 is exact
    check(3100, &[200, 300, 1000], &[(200, 1), (300, 3), (1000, 2)]);
}

#[test]
fn test_input_order_and_duplicates_do_not_matter() {
    let sorted = solve(12001, &DEFAULT_PACKS).unwrap();
    assert_eq!(solve(12001, &[5000, 250, 2000, 500, 1000]).unwrap(), sorted);
    assert_eq!(solve(12001, &[1000, 5000, 5000, 250, 500, 2000, 250]).unwrap(), sorted);

    let sizes = [757, 3, 151, 31, 53, 23];
    assert_eq!(solve(508, &sizes).unwrap(), packs(&[(3, 3), (23, 2), (151, 3)]));
}

#[test]
fn test_nothing_requested() {
    assert!(solve(0, &DEFAULT_PACKS).unwrap().is_empty());
    assert!(solve(-1, &DEFAULT_PACKS).unwrap().is_empty());
}

#[test]
fn test_invalid_sizes() {
    assert!(solve(10, &[]).unwrap_err().is_client_error());
    assert!(solve(10, &[5, 0]).unwrap_err().is_client_error());
    assert!(solve(10, &[-5]).unwrap_err().is_client_error());
}
