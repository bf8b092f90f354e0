/// Matrix orientation marker
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum MatrixShape {
    /// Normal matrix orientation
    N,
    /// Transposed matrix orientation
    T,
}

/// Adjoint (transposed) view of a matrix
#[derive(Debug, Clone, Copy)]
pub struct Adjoint<'a, M> {
    pub src: &'a M,
}

/// Symmetric view of a matrix, with data held in the upper triangle
#[derive(Debug, Clone, Copy)]
pub struct Symmetric<'a, M> {
    pub src: &'a M,
}

/// Dimension queries shared by matrices and their views
pub trait ShapedMatrix {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn shape(&self) -> MatrixShape;
    fn size(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }
    fn is_square(&self) -> bool {
        self.nrows() == self.ncols()
    }
}

impl<M: ShapedMatrix> ShapedMatrix for Adjoint<'_, M> {
    fn nrows(&self) -> usize {
        self.src.ncols()
    }
    fn ncols(&self) -> usize {
        self.src.nrows()
    }
    fn shape(&self) -> MatrixShape {
        MatrixShape::T
    }
}

impl<M: ShapedMatrix> ShapedMatrix for Symmetric<'_, M> {
    fn nrows(&self) -> usize {
        self.src.nrows()
    }
    fn ncols(&self) -> usize {
        self.src.ncols()
    }
    fn shape(&self) -> MatrixShape {
        MatrixShape::N
    }
}
