//! Fixed-size arrays: indexing, inferred length, iteration, comparison, and
//! the difference between passing an array by value and by reference.

/// Arrays are `Copy` when their elements are; the callee mutates its own copy.
#[allow(unused_assignments)]
pub fn mutate_copy(mut arr: [i32; 3]) {
    arr[0] = 1;
}

/// Through a mutable reference the caller's array changes.
pub fn mutate_in_place(arr: &mut [i32; 3]) {
    arr[0] = 100;
}

/// Walk through the array lesson, one line per observation.
pub fn array_demo() -> Vec<String> {
    let mut lines = Vec::new();

    let a: [i32; 3] = [1, 2, 3];
    lines.push(format!("a[0] = {}", a[0]));
    lines.push(format!("a.get(10) = {:?}", a.get(10)));

    let b = [1, 2, 3];
    lines.push(format!("b has {} elements, b[0] = {}", b.len(), b[0]));
    for (i, item) in b.iter().enumerate() {
        lines.push(format!("b[{i}] = {item}"));
    }

    let q = [11, 22, 33];
    let w = [11, 22, 33];
    lines.push(format!("q == w: {}", q == w));
    lines.push(format!("q == b: {}", q == b));

    let e = [11, 22, 33];
    lines.push(format!("before mutate_copy: e[0] = {}", e[0]));
    mutate_copy(e);
    lines.push(format!("after mutate_copy: e[0] = {}", e[0]));

    let mut r = [11, 22, 33];
    lines.push(format!("before mutate_in_place: r[0] = {}", r[0]));
    mutate_in_place(&mut r);
    lines.push(format!("after mutate_in_place: r[0] = {}", r[0]));

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_value_leaves_caller_unchanged() {
        let e = [11, 22, 33];
        mutate_copy(e);
        assert_eq!(e, [11, 22, 33]);
    }

    #[test]
    fn test_by_reference_mutates_caller() {
        let mut r = [11, 22, 33];
        mutate_in_place(&mut r);
        assert_eq!(r, [100, 22, 33]);
    }

    #[test]
    fn test_demo_lines() {
        let lines = array_demo();
        assert!(lines.contains(&"a.get(10) = None".to_string()));
        assert!(lines.contains(&"q == w: true".to_string()));
        assert!(lines.contains(&"q == b: false".to_string()));
        assert!(lines.contains(&"after mutate_copy: e[0] = 11".to_string()));
        assert!(lines.contains(&"after mutate_in_place: r[0] = 100".to_string()));
    }
}
