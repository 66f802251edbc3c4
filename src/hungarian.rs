use crate::layout::MAX_BOXES;
use arrayvec::ArrayVec;

/// Read-only square-or-rectangular view of a cost table.
pub trait Matrix<T> {
    fn get(&self, row: usize, col: usize) -> T;
    fn shape(&self) -> (usize, usize);
}

impl<T: Copy, const N: usize, const M: usize> Matrix<T> for [[T; M]; N] {
    fn get(&self, row: usize, col: usize) -> T {
        self[row][col]
    }

    fn shape(&self) -> (usize, usize) {
        (N, M)
    }
}

/// Row-major matrix in a fixed-capacity buffer, filled with [`push`](Self::push).
pub struct ArrayMatrix<T, const CAP: usize> {
    data: ArrayVec<T, CAP>,
    rows: usize,
    cols: usize,
}

impl<T: Copy, const CAP: usize> ArrayMatrix<T, CAP> {
    pub fn new(rows: usize, cols: usize) -> Self {
        debug_assert!(rows * cols <= CAP);
        ArrayMatrix {
            data: ArrayVec::new(),
            rows,
            cols,
        }
    }

    pub fn push(&mut self, item: T) {
        debug_assert!(self.data.len() < self.rows * self.cols);
        self.data.push(item);
    }
}

impl<T: Copy, const CAP: usize> Matrix<T> for ArrayMatrix<T, CAP> {
    fn get(&self, row: usize, col: usize) -> T {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col]
    }

    fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

/// A minimum-cost one-to-one pairing of rows with columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    total: usize,
    columns: ArrayVec<usize, MAX_BOXES>,
}

impl Assignment {
    pub fn total(&self) -> usize {
        self.total
    }

    /// The column paired with `row`.
    pub fn column(&self, row: usize) -> usize {
        self.columns[row]
    }
}

type Buffer<T> = ArrayVec<T, { MAX_BOXES + 1 }>;

fn buffer<T: Copy>(n: usize, initial_value: T) -> Buffer<T> {
    (0..=n).map(|_| initial_value).collect()
}

/// Solve the assignment problem for a square matrix of at most
/// [`MAX_BOXES`] rows.
// Potential-based O(n^3) method after Andrey Lopatin
// (https://cp-algorithms.com/graph/hungarian-algorithm.html).
pub fn min_cost_assignment(a: &impl Matrix<u16>) -> Assignment {
    const INF: i32 = i32::MAX / 2;

    let (n, m) = a.shape();
    assert!(n == m && n <= MAX_BOXES);

    // 1-indexed; slot 0 is a sentinel column.
    let mut u = buffer::<i32>(n, 0);
    let mut v = buffer::<i32>(m, 0);
    let mut p = buffer::<usize>(m, 0);
    let mut way = buffer::<usize>(m, 0);

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0;
        let mut minv = buffer::<i32>(m, INF);
        let mut used = buffer::<bool>(m, false);

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = INF;
            let mut j1 = 0;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let reduced = i32::from(a.get(i0 - 1, j - 1)) - u[i0] - v[j];
                if reduced < minv[j] {
                    minv[j] = reduced;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        // Flip the augmenting path.
        while j0 != 0 {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
        }
    }

    let mut columns: ArrayVec<usize, MAX_BOXES> = (0..n).collect();
    for j in 1..=m {
        if p[j] != 0 {
            columns[p[j] - 1] = j - 1;
        }
    }

    Assignment {
        total: usize::try_from(-v[0]).unwrap_or(0),
        columns,
    }
}
