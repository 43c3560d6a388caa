//! Functions and closures: parameters, multiple results, variadic
//! arguments, function types, functions as values, and captured state.
//!
//! Integer arithmetic wraps on overflow, so every function here is total.

use std::io::{self, Write};

/// Parameters and a return value.
pub fn add(x: i64, y: i64) -> i64 {
    x.wrapping_add(y)
}

/// Parameters and no return value.
pub fn print_sum<W: Write>(out: &mut W, x: i64, y: i64) -> io::Result<()> {
    writeln!(out, "{}", add(x, y))
}

/// No parameters and no return value.
pub fn hello<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "hello world")
}

/// Same contract as [`add`], with both parameters sharing one type.
pub fn add_shorthand(x: i64, y: i64) -> i64 {
    add(x, y)
}

/// Two results at once.
pub fn sum_and_difference(x: i64, y: i64) -> (i64, i64) {
    let sum = x.wrapping_add(y);
    let difference = x.wrapping_sub(y);
    (sum, difference)
}

/// Any number of arguments; zero for none.
pub fn sum_all(xs: &[i64]) -> i64 {
    xs.iter().fold(0, |acc, x| acc.wrapping_add(*x))
}

/// A fixed parameter followed by a variable tail.
pub fn sum_onto(x: i64, ys: &[i64]) -> i64 {
    ys.iter().fold(x, |acc, y| acc.wrapping_add(*y))
}

/// Empty input gives an empty `Vec`, which does not allocate.
pub fn digits_for(s: &str) -> Vec<i32> {
    if s.is_empty() {
        return Vec::new();
    }
    vec![0]
}

/// Any function taking two integers and returning one.
pub type Calculation = fn(i64, i64) -> i64;

pub fn sum(x: i64, y: i64) -> i64 {
    x.wrapping_add(y)
}

pub fn sub(x: i64, y: i64) -> i64 {
    x.wrapping_sub(y)
}

/// Bind `sum` and `sub` to `Calculation` variables and call them.
///
/// Returns `(type name, a(1, 2))` for each variable.
pub fn calculation_demo() -> Vec<(&'static str, i64)> {
    let a: Calculation = sum;
    let b: Calculation = sub;
    vec![
        (std::any::type_name_of_val(&a), a(1, 2)),
        (std::any::type_name_of_val(&b), b(1, 2)),
    ]
}

/// A function as an argument.
pub fn apply<F>(x: i64, y: i64, f: F) -> i64
where
    F: Fn(i64, i64) -> i64,
{
    f(x, y)
}

/// A function as a return value: the returned filter reports whether a
/// name is in `names`.
pub fn membership_filter(names: Vec<String>) -> impl Fn(&str) -> bool {
    move |name| names.iter().any(|known| known == name)
}

/// A closure stored in a variable, and one invoked where it is defined.
pub fn anonymous_demo() -> (i64, i64) {
    let add = |x: i64, y: i64| x + y;
    let stored = add(1, 2);
    let immediate = (|x: i64, y: i64| x - y)(1, 2);
    (stored, immediate)
}

/// A running total starting from zero.
pub fn accumulator() -> impl FnMut(i64) -> i64 {
    accumulator_from(0)
}

/// A running total starting from `x`. Each call adds its argument and
/// returns the new total.
pub fn accumulator_from(mut x: i64) -> impl FnMut(i64) -> i64 {
    move |y| {
        x = x.wrapping_add(y);
        x
    }
}

/// Run every function in this lesson and collect what it printed or
/// returned, one line per call.
pub fn run() -> io::Result<Vec<String>> {
    let mut lines = Vec::new();

    lines.push(format!("add(1, 2) = {}", add(1, 2)));
    let mut printed = Vec::new();
    print_sum(&mut printed, 1, 2)?;
    hello(&mut printed)?;
    lines.extend(String::from_utf8_lossy(&printed).lines().map(str::to_string));
    lines.push(format!("add_shorthand(3, 4) = {}", add_shorthand(3, 4)));

    let (s, d) = sum_and_difference(5, 3);
    lines.push(format!("sum_and_difference(5, 3) = ({s}, {d})"));
    lines.push(format!("sum_all([]) = {}", sum_all(&[])));
    lines.push(format!("sum_all([1, 2, 3]) = {}", sum_all(&[1, 2, 3])));
    lines.push(format!("sum_onto(10, [1, 2, 3]) = {}", sum_onto(10, &[1, 2, 3])));
    lines.push(format!("digits_for(\"\") = {:?}", digits_for("")));
    lines.push(format!("digits_for(\"x\") = {:?}", digits_for("x")));

    for (name, result) in calculation_demo() {
        lines.push(format!("type of calculation: {name}, called with (1, 2): {result}"));
    }

    lines.push(format!("apply(10, 20, add) = {}", apply(10, 20, add)));

    let letters = ["a", "b", "c", "d", "e", "f"].map(String::from).to_vec();
    let is_known = membership_filter(letters);
    lines.push(format!("filter(\"a\") = {}", is_known("a")));
    lines.push(format!("filter(\"ff\") = {}", is_known("ff")));

    let (stored, immediate) = anonymous_demo();
    lines.push(format!("stored closure: {stored}, immediate closure: {immediate}"));

    let mut f = accumulator();
    lines.push(format!("accumulator: {} {} {}", f(10), f(20), f(30)));
    let mut g = accumulator_from(10);
    lines.push(format!("accumulator_from(10): {} {} {}", g(10), g(20), g(30)));

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_add_matches_operator() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let x = rng.gen_range(-1_000_000..=1_000_000);
            let y = rng.gen_range(-1_000_000..=1_000_000);
            assert_eq!(add(x, y), x + y);
            assert_eq!(add_shorthand(x, y), x + y);
            assert_eq!(sum_and_difference(x, y), (x + y, x - y));
        }
    }

    #[test]
    fn test_arbitrary_integers_wrap() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let x: i64 = rng.gen();
            let y: i64 = rng.gen();
            assert_eq!(add(x, y), x.wrapping_add(y));
            assert_eq!(sum_and_difference(x, y), (x.wrapping_add(y), x.wrapping_sub(y)));
            assert_eq!(sum_onto(x, &[y]), add(x, y));
        }
    }

    #[test]
    fn test_overflow_edges() {
        assert_eq!(add(i64::MAX, 1), i64::MIN);
        assert_eq!(sum_and_difference(i64::MIN, 1), (i64::MIN + 1, i64::MAX));
        assert_eq!(sum_all(&[i64::MAX, i64::MAX]), -2);
        assert_eq!(sub(i64::MIN, 1), i64::MAX);

        let mut total = accumulator_from(i64::MAX);
        assert_eq!(total(1), i64::MIN);
    }

    #[test]
    fn test_sum_and_difference_edges() {
        assert_eq!(sum_and_difference(0, 0), (0, 0));
        assert_eq!(sum_and_difference(-3, 5), (2, -8));
        assert_eq!(sum_and_difference(7, -2), (5, 9));
    }

    #[test]
    fn test_variadic_sums() {
        assert_eq!(sum_all(&[]), 0);
        assert_eq!(sum_all(&[1, -2, 3]), 2);
        assert_eq!(sum_onto(10, &[]), 10);
        assert_eq!(sum_onto(10, &[1, 2, 3]), 16);

        let mut rng = rand::thread_rng();
        let xs: Vec<i64> = (0..50).map(|_| rng.gen_range(-1000..=1000)).collect();
        assert_eq!(sum_all(&xs), xs.iter().copied().sum::<i64>());
    }

    #[test]
    fn test_digits_for_empty_does_not_allocate() {
        let empty = digits_for("");
        assert!(empty.is_empty());
        assert_eq!(empty.capacity(), 0);
        assert_eq!(digits_for("abc"), vec![0]);
    }

    #[test]
    fn test_printing_functions() {
        let mut out = Vec::new();
        print_sum(&mut out, 1, 2).unwrap();
        hello(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "3\nhello world\n");
    }

    #[test]
    fn test_calculation_demo() {
        let results = calculation_demo();
        assert_eq!(results[0].1, 3);
        assert_eq!(results[1].1, -1);
        assert!(results[0].0.contains("fn("));
    }

    #[test]
    fn test_apply() {
        assert_eq!(apply(10, 20, add), 30);
        assert_eq!(apply(10, 20, sub), -10);
        assert_eq!(apply(2, 3, |x, y| x * y), 6);
    }

    #[test]
    fn test_membership_filter() {
        let f = membership_filter(vec!["a".to_string(), "b".to_string()]);
        assert!(f("a"));
        assert!(!f("ff"));
    }

    #[test]
    fn test_anonymous_demo() {
        assert_eq!(anonymous_demo(), (3, -1));
    }

    #[test]
    fn test_accumulators_keep_independent_state() {
        let mut f = accumulator();
        assert_eq!([f(10), f(20), f(30)], [10, 30, 60]);

        let mut g = accumulator_from(10);
        assert_eq!([g(10), g(20), g(30)], [20, 40, 70]);

        let mut fresh = accumulator();
        assert_eq!(fresh(10), 10);
        assert_eq!(f(1), 61);
    }

    #[test]
    fn test_run_reports_every_call() {
        let lines = run().unwrap();
        assert!(lines.contains(&"3".to_string()));
        assert!(lines.contains(&"hello world".to_string()));
        assert!(lines.contains(&"accumulator: 10 30 60".to_string()));
        assert!(lines.contains(&"accumulator_from(10): 20 40 70".to_string()));
    }
}
