use burn::{
    nn::{
        PaddingConfig2d, Relu,
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
    },
    prelude::*,
};

/// Configuration for the global-context depth network.
///
/// This is the topology half of a snapshot: it is saved next to the weight
/// record as `<stem>.json` and loaded back before the weights.
#[derive(Config, Debug)]
pub struct GlobalContextNetConfig {
    #[config(default = 3)]
    pub input_channels: usize,
    #[config(default = 32)]
    pub features: usize,
    #[config(default = 27)]
    pub output_height: usize,
    #[config(default = 37)]
    pub output_width: usize,
}

impl GlobalContextNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> GlobalContextNet<B> {
        GlobalContextNet::new(device, self.clone())
    }

    /// Output size of the depth blob, `[height, width]`.
    pub fn output_size(&self) -> [usize; 2] {
        [self.output_height, self.output_width]
    }
}

/// Convolutional depth estimator with a global-context branch.
///
/// A strided conv stack reduces the input to the output resolution, a
/// globally pooled context vector is broadcast back onto the feature map,
/// and a 1x1 head produces the single-channel depth blob.
#[derive(Module, Debug)]
pub struct GlobalContextNet<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    context: Conv2d<B>,
    head: Conv2d<B>,
    pool: MaxPool2d,
    global_pool: AdaptiveAvgPool2d,
    shrink: AdaptiveAvgPool2d,
    activation: Relu,
}

impl<B: Backend> GlobalContextNet<B> {
    pub fn new(device: &B::Device, config: GlobalContextNetConfig) -> Self {
        let features = config.features;
        Self {
            conv1: Conv2dConfig::new([config.input_channels, features], [5, 5])
                .with_stride([2, 2])
                .with_padding(PaddingConfig2d::Explicit(2, 2))
                .init(device),
            conv2: Conv2dConfig::new([features, features * 2], [3, 3])
                .with_padding(PaddingConfig2d::Same)
                .init(device),
            context: Conv2dConfig::new([features * 2, features * 2], [1, 1]).init(device),
            head: Conv2dConfig::new([features * 2, 1], [1, 1]).init(device),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            global_pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            shrink: AdaptiveAvgPool2dConfig::new(config.output_size()).init(),
            activation: Relu::new(),
        }
    }

    /// Forward pass: `[N, C, H, W]` input, `[N, 1, OUT_H, OUT_W]` depth
    /// output.
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.activation.forward(self.conv1.forward(input));
        let x = self.pool.forward(x);
        let x = self.activation.forward(self.conv2.forward(x));
        let x = self.pool.forward(x);
        let x = self.shrink.forward(x);
        let context = self.context.forward(self.global_pool.forward(x.clone()));
        self.head.forward(x + context)
    }
}
