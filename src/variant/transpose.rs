//! Rank-2 layout conversion for engine results.
//!
//! The engine hands back matrices row-major; callers expect them with rows
//! and columns swapped. Every element kind is re-oriented; arrays of any
//! other rank and non-array values are returned as an unchanged copy.

use super::{Array, Variant, VariantArray};

/// Transpose a rank-2 array.
///
/// The result is always a fresh allocation of the same kind with shape
/// `[cols, rows]` and `out[j][i] == input[i][j]`. Arrays of any other rank
/// come back unchanged.
pub fn transpose(array: &VariantArray) -> VariantArray {
    match array {
        VariantArray::Int(a) => VariantArray::Int(transpose_rank2(a)),
        VariantArray::Double(a) => VariantArray::Double(transpose_rank2(a)),
        VariantArray::Bool(a) => VariantArray::Bool(transpose_rank2(a)),
        VariantArray::Object(a) => VariantArray::Object(transpose_rank2(a)),
        VariantArray::Text(a) => VariantArray::Text(transpose_rank2(a)),
    }
}

/// Transpose when the variant is an array; identity for everything else.
pub fn transpose_variant(value: &Variant) -> Variant {
    match value {
        Variant::Array(array) => Variant::Array(transpose(array)),
        other => other.clone(),
    }
}

fn transpose_rank2<T: Clone>(input: &Array<T>) -> Array<T> {
    if input.rank() != 2 {
        return input.clone();
    }

    let n_rows = input.shape[0];
    let n_cols = input.shape[1];
    let mut data = Vec::with_capacity(input.data.len());
    for j in 0..n_cols {
        for i in 0..n_rows {
            data.push(input.data[i * n_cols + j].clone());
        }
    }

    Array {
        shape: vec![n_cols, n_rows],
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_matrix(rows: Vec<Vec<i32>>) -> VariantArray {
        VariantArray::Int(Array::from_rows(rows).unwrap())
    }

    fn assert_transposed<T: Clone + PartialEq + std::fmt::Debug>(a: &Array<T>, t: &Array<T>) {
        let (r, c) = (a.shape()[0], a.shape()[1]);
        assert_eq!(t.shape(), &[c, r]);
        for i in 0..r {
            for j in 0..c {
                assert_eq!(t.get(j, i), a.get(i, j), "mismatch at ({}, {})", i, j);
            }
        }
    }

    #[test]
    fn test_int_matrix_is_reoriented() {
        let input = int_matrix(vec![vec![1, 2, 3], vec![4, 5, 6]]);
        let output = transpose(&input);
        assert_eq!(
            output,
            int_matrix(vec![vec![1, 4], vec![2, 5], vec![3, 6]])
        );
    }

    #[test]
    fn test_every_supported_kind() {
        let doubles = Array::from_rows(vec![vec![0.5, 1.5], vec![2.5, 3.5], vec![4.5, 5.5]]).unwrap();
        match transpose(&VariantArray::Double(doubles.clone())) {
            VariantArray::Double(t) => assert_transposed(&doubles, &t),
            other => panic!("Expected Double array, got {:?}", other),
        }

        let bools = Array::from_rows(vec![vec![true, false, false]]).unwrap();
        match transpose(&VariantArray::Bool(bools.clone())) {
            VariantArray::Bool(t) => assert_transposed(&bools, &t),
            other => panic!("Expected Bool array, got {:?}", other),
        }

        let objects = Array::from_rows(vec![
            vec![Variant::from("age"), Variant::Int(65)],
            vec![Variant::from("rate"), Variant::Double(0.045)],
        ])
        .unwrap();
        match transpose(&VariantArray::Object(objects.clone())) {
            VariantArray::Object(t) => assert_transposed(&objects, &t),
            other => panic!("Expected Object array, got {:?}", other),
        }
    }

    #[test]
    fn test_input_is_not_mutated() {
        let input = int_matrix(vec![vec![1, 2], vec![3, 4]]);
        let snapshot = input.clone();
        let _ = transpose(&input);
        assert_eq!(input, snapshot);
    }

    #[test]
    fn test_double_transpose_restores_input() {
        let inputs = [
            int_matrix(vec![vec![7, 8, 9, 10], vec![11, 12, 13, 14], vec![15, 16, 17, 18]]),
            VariantArray::Double(
                Array::from_rows(vec![vec![0.25, -1.0], vec![3.5, 8.0], vec![f64::MAX, 0.0]]).unwrap(),
            ),
            VariantArray::Bool(
                Array::from_rows(vec![vec![true, false, true], vec![false, false, true]]).unwrap(),
            ),
            VariantArray::Object(
                Array::from_rows(vec![
                    vec![Variant::Empty, Variant::Int(1), Variant::from("x")],
                    vec![Variant::Bool(true), Variant::Double(2.5), Variant::Sequence(vec![])],
                ])
                .unwrap(),
            ),
            VariantArray::Text(
                Array::from_rows(vec![vec!["a".to_string()], vec!["b".to_string()]]).unwrap(),
            ),
        ];
        for input in inputs {
            assert_eq!(transpose(&transpose(&input)), input, "{} round trip", input.kind());
        }
    }

    #[test]
    fn test_other_ranks_pass_through() {
        let vector = VariantArray::Double(Array::new(vec![4], vec![1.0, 2.0, 3.0, 4.0]).unwrap());
        assert_eq!(transpose(&vector), vector);

        let cube = VariantArray::Int(Array::new(vec![2, 2, 2], (0..8).collect()).unwrap());
        assert_eq!(transpose(&cube), cube);
    }

    #[test]
    fn test_text_matrix_is_reoriented() {
        let text = Array::from_rows(vec![
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec!["d".to_string(), "e".to_string(), "f".to_string()],
        ])
        .unwrap();
        match transpose(&VariantArray::Text(text.clone())) {
            VariantArray::Text(t) => assert_transposed(&text, &t),
            other => panic!("Expected Text array, got {:?}", other),
        }
    }

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(transpose_variant(&Variant::Int(3)), Variant::Int(3));
        assert_eq!(transpose_variant(&Variant::Empty), Variant::Empty);
        let seq = Variant::Sequence(vec![Variant::Int(1)]);
        assert_eq!(transpose_variant(&seq), seq);
    }

    #[test]
    fn test_degenerate_dimensions() {
        let empty_cols = VariantArray::Int(Array::new(vec![3, 0], vec![]).unwrap());
        assert_eq!(transpose(&empty_cols).shape(), &[0, 3]);

        let column = int_matrix(vec![vec![1], vec![2], vec![3]]);
        assert_eq!(transpose(&column), int_matrix(vec![vec![1, 2, 3]]));
    }
}
