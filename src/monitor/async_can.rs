/// Until the [`embedded-can`] crate supports async, we need to define our own
/// trait. The monitor only listens, so receiving is all a driver has to
/// provide.
#[allow(async_fn_in_trait)]
pub trait AsyncCan {
    type Error;

    type Frame: embedded_can::Frame;

    async fn receive(&mut self) -> Result<Self::Frame, Self::Error>;
}

impl<T> AsyncCan for &mut T
where
    T: AsyncCan,
{
    type Error = T::Error;
    type Frame = T::Frame;

    async fn receive(&mut self) -> Result<Self::Frame, Self::Error> {
        (*self).receive().await
    }
}
