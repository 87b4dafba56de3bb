use serde::{Serialize, Deserialize};
use std::ops::{Add, Mul};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map_or(0, |row| row.len()),
            data
        }
    }

    /// Single-row matrix holding `values`.
    pub fn row(values: Vec<f64>) -> Matrix {
        Matrix::from_data(vec![values])
    }

    /// True when `data` really is `rows × cols`.
    ///
    /// Deserialized matrices carry their dimensions separately from the data,
    /// so a hand-edited or truncated model file can disagree with itself.
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.rows && self.data.iter().all(|row| row.len() == self.cols)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Add for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, self.cols);

        for i in 0..self.rows {
            for j in 0..self.cols {
                res.data[i][j] = self.data[i][j] + rhs.data[i][j];
            }
        }

        res
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.cols != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res =  Matrix::zeros(self.rows, rhs.cols);

        // i-k-j order: the inner loop walks one row of `rhs` at a time.
        for i in 0..self.rows {
            for k in 0..self.cols {
                let lhs = self.data[i][k];
                for j in 0..rhs.cols {
                    res.data[i][j] += lhs * rhs.data[k][j];
                }
            }
        }

        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplies_row_by_matrix() {
        let x = Matrix::row(vec![1.0, 2.0]);
        let w = Matrix::from_data(vec![vec![1.0, 0.0, -1.0], vec![0.5, 2.0, 1.0]]);
        let out = &x * &w;
        assert_eq!(out, Matrix::row(vec![2.0, 4.0, 1.0]));
    }

    #[test]
    fn adds_elementwise() {
        let a = Matrix::row(vec![1.0, -1.0]);
        let b = Matrix::row(vec![0.5, 0.5]);
        assert_eq!(&a + &b, Matrix::row(vec![1.5, -0.5]));
    }

    #[test]
    fn detects_ragged_data() {
        let mut m = Matrix::zeros(2, 3);
        assert!(m.is_well_formed());
        m.data[1].pop();
        assert!(!m.is_well_formed());
        m.rows = 5;
        assert!(!m.is_well_formed());
    }

    #[test]
    fn from_empty_data_has_zero_shape() {
        let m = Matrix::from_data(vec![]);
        assert_eq!((m.rows, m.cols), (0, 0));
    }
}
